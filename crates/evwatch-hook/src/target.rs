//! Dispatch target descriptors.
//!
//! Records carry a short human-readable descriptor of what the event was
//! dispatched on, not a handle to the target itself. Resolution order for
//! elements: id selector, then tag plus classes, then bare tag, then the
//! `[Element]` fallback.

/// Descriptor for an element whose identity cannot be read at all.
pub const ELEMENT: &str = "[Element]";

/// Descriptor when the dispatch target is absent or not a node.
pub const UNKNOWN_TARGET: &str = "[Unknown Target]";

/// What an event was dispatched on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventTarget {
    /// The document root.
    Document,
    /// The global window.
    Window,
    /// A document element.
    ///
    /// Fields mirror what the host exposes; any of them may be missing or
    /// empty on exotic nodes. `classes` is the raw space-separated class
    /// string.
    Element {
        /// Tag name, in whatever case the host reports.
        tag: Option<String>,
        /// Element id attribute.
        id: Option<String>,
        /// Space-separated class list.
        classes: Option<String>,
    },
}

impl EventTarget {
    /// An element known only by its tag.
    #[must_use]
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element {
            tag: Some(tag.into()),
            id: None,
            classes: None,
        }
    }

    /// Set the element id.
    #[must_use]
    pub fn with_id(self, id: impl Into<String>) -> Self {
        match self {
            Self::Element { tag, classes, .. } => Self::Element {
                tag,
                id: Some(id.into()),
                classes,
            },
            other => other,
        }
    }

    /// Set the space-separated class list.
    #[must_use]
    pub fn with_classes(self, classes: impl Into<String>) -> Self {
        match self {
            Self::Element { tag, id, .. } => Self::Element {
                tag,
                id,
                classes: Some(classes.into()),
            },
            other => other,
        }
    }

    /// The human-readable descriptor for this target.
    #[must_use]
    pub fn descriptor(&self) -> String {
        match self {
            Self::Document => "document".to_string(),
            Self::Window => "window".to_string(),
            Self::Element { tag, id, classes } => {
                if let Some(id) = non_empty(id.as_deref()) {
                    return format!("#{id}");
                }
                match (non_empty(tag.as_deref()), non_empty(classes.as_deref())) {
                    (Some(tag), Some(classes)) => {
                        let classes = classes.split(' ').collect::<Vec<_>>().join(".");
                        format!("{}.{classes}", tag.to_lowercase())
                    }
                    // A class list without a readable tag is an access failure.
                    (None, Some(_)) => ELEMENT.to_string(),
                    (Some(tag), None) => tag.to_lowercase(),
                    (None, None) => ELEMENT.to_string(),
                }
            }
        }
    }
}

/// Descriptor for an optional target; absent targets get the unknown
/// sentinel.
#[must_use]
pub fn describe_target(target: Option<&EventTarget>) -> String {
    target.map_or_else(|| UNKNOWN_TARGET.to_string(), EventTarget::descriptor)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_and_window_use_fixed_literals() {
        assert_eq!(EventTarget::Document.descriptor(), "document");
        assert_eq!(EventTarget::Window.descriptor(), "window");
    }

    #[test]
    fn id_wins_over_everything_else() {
        let target = EventTarget::element("DIV")
            .with_id("root")
            .with_classes("a b");
        assert_eq!(target.descriptor(), "#root");
    }

    #[test]
    fn tag_and_classes_build_a_class_selector() {
        let target = EventTarget::element("DIV").with_classes("btn primary");
        assert_eq!(target.descriptor(), "div.btn.primary");
    }

    #[test]
    fn doubled_spaces_leave_empty_class_segments() {
        let target = EventTarget::element("SPAN").with_classes("a  b");
        assert_eq!(target.descriptor(), "span.a..b");
    }

    #[test]
    fn bare_tag_lowercases() {
        assert_eq!(EventTarget::element("BUTTON").descriptor(), "button");
    }

    #[test]
    fn empty_id_falls_through_to_tag() {
        let target = EventTarget::element("P").with_id("");
        assert_eq!(target.descriptor(), "p");
    }

    #[test]
    fn classes_without_a_tag_are_an_access_failure() {
        let target = EventTarget::Element {
            tag: None,
            id: None,
            classes: Some("a".to_string()),
        };
        assert_eq!(target.descriptor(), ELEMENT);
    }

    #[test]
    fn element_with_nothing_readable_uses_the_fallback() {
        let target = EventTarget::Element {
            tag: None,
            id: None,
            classes: None,
        };
        assert_eq!(target.descriptor(), ELEMENT);
    }

    #[test]
    fn absent_target_is_unknown() {
        assert_eq!(describe_target(None), UNKNOWN_TARGET);
        assert_eq!(
            describe_target(Some(&EventTarget::Document)),
            "document"
        );
    }
}
