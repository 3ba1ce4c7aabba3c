//! Host-side event model.
//!
//! [`HostEvent`] is what the host hands to [`Dispatch::dispatch`]. Its
//! optional detail is a [`DetailValue`] tree: a host-value model rich enough
//! to express the object kinds the serializer must recognize, including
//! shared nodes that may form cycles.
//!
//! [`Dispatch::dispatch`]: crate::dispatch::Dispatch::dispatch

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::target::EventTarget;

/// A node that may be referenced from more than one place in a detail tree.
pub type SharedDetail = Rc<RefCell<DetailValue>>;

/// A host value attached to a dispatch as its detail payload.
#[derive(Clone, Debug)]
pub enum DetailValue {
    /// The host's null.
    Null,
    /// The host's undefined.
    Undefined,
    /// A boolean.
    Bool(bool),
    /// An integer number.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A text value.
    Text(String),
    /// A date object.
    Date(DateTime<Utc>),
    /// An error object, carrying its message.
    Error(String),
    /// A document node.
    DomNode,
    /// A binary blob handle.
    Blob,
    /// A file handle.
    File,
    /// An ordered list of values.
    Array(Vec<DetailValue>),
    /// Own keys and values, in insertion order.
    Object(Vec<(String, DetailValue)>),
    /// A reference to a node that may be shared or cyclic.
    Shared(SharedDetail),
    /// A value of no recognized kind, such as a function.
    Opaque,
}

impl DetailValue {
    /// A text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// An array from any iterable of values.
    #[must_use]
    pub fn array(items: impl IntoIterator<Item = DetailValue>) -> Self {
        Self::Array(items.into_iter().collect())
    }

    /// An object from any iterable of key/value pairs.
    #[must_use]
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, DetailValue)>,
    {
        Self::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    /// A freshly allocated shared node holding `value`.
    #[must_use]
    pub fn shared_cell(value: DetailValue) -> SharedDetail {
        Rc::new(RefCell::new(value))
    }

    /// A reference to an existing shared node.
    #[must_use]
    pub fn shared(cell: &SharedDetail) -> Self {
        Self::Shared(Rc::clone(cell))
    }
}

/// An event as the host dispatches it.
#[derive(Clone, Debug)]
pub struct HostEvent {
    /// Event name.
    pub name: String,
    /// Developer payload. Builtin events have none.
    pub detail: Option<DetailValue>,
    /// What the event was dispatched on, when known.
    pub target: Option<EventTarget>,
    /// Whether this is a custom event.
    pub custom: bool,
}

impl HostEvent {
    /// A custom event carrying a detail payload.
    ///
    /// Hosts hand `DetailValue::Null` for custom events constructed without
    /// an explicit payload.
    #[must_use]
    pub fn custom(name: impl Into<String>, detail: DetailValue) -> Self {
        Self {
            name: name.into(),
            detail: Some(detail),
            target: None,
            custom: true,
        }
    }

    /// A builtin event with no detail slot.
    #[must_use]
    pub fn builtin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
            target: None,
            custom: false,
        }
    }

    /// Attach a dispatch target.
    #[must_use]
    pub fn with_target(mut self, target: EventTarget) -> Self {
        self.target = Some(target);
        self
    }
}
