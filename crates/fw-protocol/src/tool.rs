//! Tool descriptors and tool call results

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool advertised by the server in its `tools/list` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name used in `tools/call`
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the tool arguments
    #[serde(default, rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Extract the tool list from a `tools/list` result.
    ///
    /// Entries that do not describe a tool are skipped.
    pub fn list_from_result(result: &Value) -> Vec<Self> {
        result
            .get("tools")
            .and_then(Value::as_array)
            .map(|tools| {
                tools
                    .iter()
                    .filter_map(|tool| serde_json::from_value(tool.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Unwrapped result of a `tools/call` request
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Structured output (the text content parsed as JSON, or a raw result)
    Json(Value),
    /// Text content that is not JSON
    Text(String),
}

impl ToolOutput {
    /// Unwrap a tool call result.
    ///
    /// If the result carries a non-empty `content` list, the `text` of the
    /// first item is parsed as JSON, falling back to the raw text. Otherwise
    /// the result object itself is returned.
    pub fn from_result(result: Value) -> Self {
        let first = result
            .get("content")
            .and_then(Value::as_array)
            .and_then(|content| content.first());

        match first {
            Some(item) => {
                let text = item.get("text").and_then(Value::as_str).unwrap_or("");
                match serde_json::from_str(text) {
                    Ok(value) => Self::Json(value),
                    Err(_) => Self::Text(text.to_string()),
                }
            }
            None => Self::Json(result),
        }
    }

    /// Whether the output carries nothing useful.
    ///
    /// Null, `false`, zero, and empty strings, arrays and objects all count
    /// as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Json(Value::Null) => true,
            Self::Json(Value::Bool(b)) => !b,
            Self::Json(Value::Number(n)) => n.as_f64() == Some(0.0),
            Self::Json(Value::String(s)) => s.is_empty(),
            Self::Json(Value::Array(a)) => a.is_empty(),
            Self::Json(Value::Object(o)) => o.is_empty(),
        }
    }

    /// Convert into a JSON value (text becomes a JSON string)
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_content_parsed_as_json() {
        let result = json!({"content": [{"type": "text", "text": "{\"url\": \"https://x/form\"}"}]});
        assert_eq!(
            ToolOutput::from_result(result),
            ToolOutput::Json(json!({"url": "https://x/form"}))
        );
    }

    #[test]
    fn test_text_content_falls_back_to_raw_text() {
        let snapshot = "- textbox \"Name\" [ref=e5]\n- button \"Submit\" [ref=e6]";
        let result = json!({"content": [{"type": "text", "text": snapshot}]});
        assert_eq!(
            ToolOutput::from_result(result),
            ToolOutput::Text(snapshot.to_string())
        );
    }

    #[test]
    fn test_result_without_content_returned_whole() {
        let result = json!({"isError": false});
        assert_eq!(ToolOutput::from_result(result.clone()), ToolOutput::Json(result));

        let empty_content = json!({"content": []});
        assert_eq!(
            ToolOutput::from_result(empty_content.clone()),
            ToolOutput::Json(empty_content)
        );
    }

    #[test]
    fn test_missing_text_is_empty() {
        let output = ToolOutput::from_result(json!({"content": [{"type": "image"}]}));
        assert_eq!(output, ToolOutput::Text(String::new()));
        assert!(output.is_empty());
    }

    #[test]
    fn test_emptiness() {
        assert!(ToolOutput::Json(json!({})).is_empty());
        assert!(ToolOutput::Json(json!(null)).is_empty());
        assert!(ToolOutput::Json(json!(0)).is_empty());
        assert!(!ToolOutput::Json(json!({"a": 1})).is_empty());
        assert!(!ToolOutput::Text("page".into()).is_empty());
    }

    #[test]
    fn test_tool_list() {
        let result = json!({"tools": [
            {"name": "browser_navigate", "description": "Navigate to a URL",
             "inputSchema": {"type": "object"}},
            {"name": "browser_snapshot"},
            {"description": "nameless"}
        ]});
        let tools = ToolDescriptor::list_from_result(&result);
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "browser_navigate");
        assert_eq!(tools[0].description.as_deref(), Some("Navigate to a URL"));
        assert_eq!(tools[1].input_schema, Value::Null);
    }
}
