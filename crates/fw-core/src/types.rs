//! Core domain types

use fw_protocol::ToolOutput;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Tag identifying which kind of action was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Click,
    Type,
    Submit,
    Wait,
}

impl ActionKind {
    /// Wire name of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Type => "type",
            ActionKind::Submit => "submit",
            ActionKind::Wait => "wait",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One action taken by the agent.
///
/// Element references are the opaque `ref` values found in page snapshots.
/// Serialized with a `type` tag, e.g.
/// `{"type": "type", "element_ref": "e1", "text": "John Doe"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Click an element
    Click {
        #[serde(default)]
        element_ref: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// Type text into an element
    Type {
        #[serde(default)]
        element_ref: String,
        #[serde(default)]
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// Click the element that submits the form
    Submit {
        #[serde(default)]
        element_ref: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// Wait for a number of seconds
    Wait {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<f64>,
    },
}

impl Action {
    /// Click the referenced element
    pub fn click(element_ref: impl Into<String>) -> Self {
        Self::Click {
            element_ref: element_ref.into(),
            description: None,
        }
    }

    /// Type `text` into the referenced element
    pub fn type_text(element_ref: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Type {
            element_ref: element_ref.into(),
            text: text.into(),
            description: None,
        }
    }

    /// Submit via the referenced element
    pub fn submit(element_ref: impl Into<String>) -> Self {
        Self::Submit {
            element_ref: element_ref.into(),
            description: None,
        }
    }

    /// Wait for `seconds`, or the environment default when `None`
    pub fn wait(seconds: Option<f64>) -> Self {
        Self::Wait { time: seconds }
    }

    /// Attach a human-readable element description.
    ///
    /// Has no effect on `Wait`.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            Self::Click { description, .. }
            | Self::Type { description, .. }
            | Self::Submit { description, .. } => *description = Some(text.into()),
            Self::Wait { .. } => {}
        }
        self
    }

    /// The action's tag
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Click { .. } => ActionKind::Click,
            Self::Type { .. } => ActionKind::Type,
            Self::Submit { .. } => ActionKind::Submit,
            Self::Wait { .. } => ActionKind::Wait,
        }
    }
}

/// Snapshot of remote UI state.
///
/// The server decides the shape: usually an accessibility tree rendered as
/// text, sometimes a structured mapping. An empty mapping stands for "no
/// observation".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observation(Value);

impl Observation {
    /// Wrap a JSON value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Observation with no content
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Whether the observation carries no content
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
            _ => false,
        }
    }

    /// Whether the observation is a mapping
    pub fn is_structured(&self) -> bool {
        self.0.is_object()
    }

    /// Borrow the underlying value
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the underlying value
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Render the observation as text.
    ///
    /// Text snapshots are returned verbatim; anything else is serialized
    /// as JSON.
    pub fn as_text(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Case-insensitive substring search over the observation's content.
    ///
    /// Structured observations are searched key by key and value by value,
    /// so quotes inside string values match unescaped.
    pub fn contains_marker(&self, marker: &str) -> bool {
        let marker = marker.to_lowercase();
        let mut text = String::new();
        collect_text(&self.0, &mut text);
        text.to_lowercase().contains(&marker)
    }
}

/// Append the keys and scalar leaves of `value` to `out`, one per line
fn collect_text(value: &Value, out: &mut String) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            out.push_str(s);
            out.push('\n');
        }
        Value::Array(items) => items.iter().for_each(|item| collect_text(item, out)),
        Value::Object(map) => {
            for (key, item) in map {
                out.push_str(key);
                out.push('\n');
                collect_text(item, out);
            }
        }
        scalar => {
            out.push_str(&scalar.to_string());
            out.push('\n');
        }
    }
}

impl Default for Observation {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<ToolOutput> for Observation {
    fn from(output: ToolOutput) -> Self {
        Self(output.into_value())
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Metadata returned alongside each step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// 1-based index of the step within the episode
    pub step: u32,
    /// True only when the episode ended because the goal was reached
    pub success: bool,
    /// Tag of the action that was executed
    pub action_type: ActionKind,
}

/// Outcome of a single environment step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Observation after the action settled
    pub observation: Observation,
    /// Scalar reward for this step
    pub reward: f64,
    /// Whether the episode has ended
    pub done: bool,
    /// Step metadata
    pub info: StepInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_wire_format() {
        let action: Action = serde_json::from_value(json!({
            "type": "type",
            "element_ref": "e1",
            "text": "John Doe",
            "description": "Name input field"
        }))
        .unwrap();

        assert_eq!(
            action,
            Action::type_text("e1", "John Doe").with_description("Name input field")
        );
        assert_eq!(action.kind(), ActionKind::Type);
    }

    #[test]
    fn test_action_defaults() {
        let action: Action = serde_json::from_value(json!({"type": "submit"})).unwrap();
        assert_eq!(action, Action::submit(""));

        let wait: Action = serde_json::from_value(json!({"type": "wait"})).unwrap();
        assert_eq!(wait, Action::wait(None));
    }

    #[test]
    fn test_unknown_action_tag_rejected() {
        let result = serde_json::from_value::<Action>(json!({"type": "scroll"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_action_kind_display() {
        assert_eq!(format!("{}", ActionKind::Submit), "submit");
        assert_eq!(Action::wait(Some(1.0)).kind().as_str(), "wait");
    }

    #[test]
    fn test_observation_marker_is_case_insensitive() {
        let text = Observation::new(json!("- heading \"THANK YOU for submitting!\""));
        assert!(text.contains_marker("Thank you"));

        let structured = Observation::new(json!({"elements": [{"name": "Thank you"}]}));
        assert!(structured.contains_marker("thank YOU"));
        assert!(!structured.contains_marker("Goodbye"));
    }

    #[test]
    fn test_observation_emptiness() {
        assert!(Observation::default().is_empty());
        assert!(Observation::default().is_structured());
        assert!(Observation::new(json!("")).is_empty());
        assert!(!Observation::new(json!("page")).is_empty());
        assert!(!Observation::new(json!("page")).is_structured());
    }

    #[test]
    fn test_observation_from_tool_output() {
        let obs = Observation::from(ToolOutput::Text("- button [ref=e2]".into()));
        assert_eq!(obs.as_text(), "- button [ref=e2]");

        let obs = Observation::from(ToolOutput::Json(json!({"url": "https://x"})));
        assert_eq!(obs.as_text(), r#"{"url":"https://x"}"#);
    }

    #[test]
    fn test_marker_with_quotes_in_structured_observation() {
        let obs = Observation::new(json!({
            "url": "https://x/form",
            "snapshot": "- heading \"Thank You\" [level=1]"
        }));
        assert!(obs.contains_marker("heading \"thank you\""));
        assert!(obs.contains_marker("snapshot"));
        assert!(!obs.contains_marker("\\\""));

        let nested = Observation::new(json!({"nodes": [{"role": "alert", "name": "Saved"}, 3]}));
        assert!(nested.contains_marker("saved"));
        assert!(!nested.contains_marker("missing"));
    }
}
