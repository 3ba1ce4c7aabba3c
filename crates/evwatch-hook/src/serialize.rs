//! Depth-bounded, cycle-safe detail rendering.
//!
//! A dispatch's detail can be any host value, including deep trees, host
//! objects, and cyclic structures. [`safe_stringify`] renders a single
//! display string under a fixed policy:
//!
//! - text renders JSON-quoted; numbers and booleans render bare;
//!   null/undefined render as their literal names
//! - recognized host kinds render as fixed forms: `[DOM Node]`, `[Blob]`,
//!   `[File]`, dates as ISO 8601 with millisecond precision, errors as
//!   `Error: <message>`
//! - arrays render element-wise `[a, b]`, objects own-keys `{"k": v}`,
//!   nested values inline
//! - values nested at depth [`MAX_SERIALIZE_DEPTH`] or beyond render as
//!   `[Max Depth Reached]`; shared nodes are transparent to the depth count
//! - revisiting a shared node already on the visiting stack collapses the
//!   whole detail to `[Circular Reference]`
//!
//! The function never panics and never fails.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::SecondsFormat;
use serde_json::Value;

use evwatch_core::constants::MAX_SERIALIZE_DEPTH;

use crate::event::DetailValue;

/// Rendered in place of values nested deeper than the serializer descends.
pub const MAX_DEPTH_REACHED: &str = "[Max Depth Reached]";

/// Rendered as the whole detail when the payload contains a cycle.
pub const CIRCULAR_REFERENCE: &str = "[Circular Reference]";

/// Rendered for document nodes.
pub const DOM_NODE: &str = "[DOM Node]";

/// Rendered for binary blob handles.
pub const BLOB: &str = "[Blob]";

/// Rendered for file handles.
pub const FILE: &str = "[File]";

/// Rendered for values of no recognized kind.
pub const UNKNOWN_TYPE: &str = "[Unknown Type]";

/// Detail recorded for captured dispatches that carry no developer payload.
pub const NOT_A_CUSTOM_EVENT: &str = "[Not a CustomEvent]";

/// Marker error: a shared node was revisited while still being rendered.
struct Cycle;

/// Render a detail payload as a single display string.
///
/// Never panics and never fails. A structural cycle anywhere in the tree
/// collapses the whole detail to [`CIRCULAR_REFERENCE`].
#[must_use]
pub fn safe_stringify(value: &DetailValue) -> String {
    let mut visiting = Vec::new();
    match render(value, 0, &mut visiting) {
        Ok(text) => text,
        Err(Cycle) => CIRCULAR_REFERENCE.to_string(),
    }
}

fn render(
    value: &DetailValue,
    depth: usize,
    visiting: &mut Vec<*const RefCell<DetailValue>>,
) -> Result<String, Cycle> {
    if depth >= MAX_SERIALIZE_DEPTH {
        return Ok(MAX_DEPTH_REACHED.to_string());
    }

    match value {
        DetailValue::Null => Ok("null".to_string()),
        DetailValue::Undefined => Ok("undefined".to_string()),
        DetailValue::Bool(flag) => Ok(flag.to_string()),
        DetailValue::Int(number) => Ok(number.to_string()),
        // Value::from maps non-finite floats to null, matching JSON semantics.
        DetailValue::Float(number) => Ok(Value::from(*number).to_string()),
        DetailValue::Text(text) => Ok(Value::from(text.as_str()).to_string()),
        DetailValue::Date(date) => Ok(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
        DetailValue::Error(message) => Ok(format!("Error: {message}")),
        DetailValue::DomNode => Ok(DOM_NODE.to_string()),
        DetailValue::Blob => Ok(BLOB.to_string()),
        DetailValue::File => Ok(FILE.to_string()),
        DetailValue::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                parts.push(render(item, depth + 1, visiting)?);
            }
            Ok(format!("[{}]", parts.join(", ")))
        }
        DetailValue::Object(entries) => {
            let mut parts = Vec::with_capacity(entries.len());
            for (key, entry) in entries {
                let rendered = render(entry, depth + 1, visiting)?;
                parts.push(format!("{}: {rendered}", Value::from(key.as_str())));
            }
            Ok(format!("{{{}}}", parts.join(", ")))
        }
        DetailValue::Shared(cell) => {
            let ptr = Rc::as_ptr(cell);
            if visiting.contains(&ptr) {
                return Err(Cycle);
            }
            visiting.push(ptr);
            let rendered = render(&cell.borrow(), depth, visiting);
            let _ = visiting.pop();
            rendered
        }
        DetailValue::Opaque => Ok(UNKNOWN_TYPE.to_string()),
    }
}
