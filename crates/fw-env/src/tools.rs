//! Browser tool surface consumed by the environment
//!
//! Names and argument shapes of the Playwright MCP tools.

use serde_json::{json, Map, Value};

/// Navigate the page to a URL
pub const NAVIGATE: &str = "browser_navigate";
/// Capture an accessibility snapshot of the page
pub const SNAPSHOT: &str = "browser_snapshot";
/// Click an element
pub const CLICK: &str = "browser_click";
/// Type text into an element
pub const TYPE: &str = "browser_type";
/// Wait for text to appear or for time to pass
pub const WAIT_FOR: &str = "browser_wait_for";

pub fn navigate_args(url: &str) -> Value {
    json!({ "url": url })
}

pub fn snapshot_args() -> Value {
    Value::Object(Map::new())
}

/// The click tool only needs the element reference
pub fn click_args(element_ref: &str) -> Value {
    json!({ "ref": element_ref })
}

pub fn type_args(element: &str, element_ref: &str, text: &str) -> Value {
    json!({ "element": element, "ref": element_ref, "text": text })
}

/// Build `browser_wait_for` arguments.
///
/// Empty text and non-positive times are left out.
pub fn wait_for_args(text: Option<&str>, time: Option<f64>) -> Value {
    let mut args = Map::new();
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        args.insert("text".to_string(), Value::from(text));
    }
    if let Some(time) = time.filter(|t| *t > 0.0) {
        args.insert("time".to_string(), Value::from(time));
    }
    Value::Object(args)
}
