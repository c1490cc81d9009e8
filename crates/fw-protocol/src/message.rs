//! JSON-RPC message types for the Formwright tool protocol
//!
//! Every HTTP exchange with the tool server carries exactly one JSON-RPC
//! 2.0 object. Requests carry an `id`; notifications omit it and the
//! server is not expected to answer them.
//!
//! # Message Flow
//!
//! 1. Client sends `initialize` with its protocol version and identity
//! 2. Server answers and assigns a session identifier in a response header
//! 3. Client sends the `initialized` notification
//! 4. Client issues `tools/list` and `tools/call` requests within the session

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// JSON-RPC version carried in every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Model Context Protocol revision announced during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Method names used by the client
pub mod method {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "initialized";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
}

/// Identity the client announces during the handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client name
    pub name: String,
    /// Client version
    pub version: String,
}

impl ClientInfo {
    /// Create a new client identity
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// A JSON-RPC request or notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Always `"2.0"`
    pub jsonrpc: String,
    /// Request id. `None` marks a notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Value,
}

impl Request {
    /// Create a request that expects a response
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: method.into(),
            params,
        }
    }

    /// Create a notification (no id, no response expected)
    pub fn notification(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: None,
            method: method.into(),
            params,
        }
    }

    /// The `initialize` handshake request
    pub fn initialize(id: u64, protocol_version: &str, client: &ClientInfo) -> Self {
        Self::new(
            id,
            method::INITIALIZE,
            json!({
                "protocolVersion": protocol_version,
                "capabilities": {},
                "clientInfo": client,
            }),
        )
    }

    /// The `initialized` notification sent after a successful handshake
    pub fn initialized() -> Self {
        Self::notification(method::INITIALIZED, json!({}))
    }

    /// List the tools exposed by the server
    pub fn tools_list(id: u64) -> Self {
        Self::new(id, method::TOOLS_LIST, json!({}))
    }

    /// Invoke a named tool
    pub fn tools_call(id: u64, name: &str, arguments: Value) -> Self {
        Self::new(
            id,
            method::TOOLS_CALL,
            json!({
                "name": name,
                "arguments": arguments,
            }),
        )
    }

    /// Whether this is a notification
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Error object carried by a failed JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    /// Error code
    pub code: i64,
    /// Human-readable message
    pub message: String,
    /// Optional extra data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC response
///
/// Decoding is lenient: servers are not required to echo `jsonrpc` or `id`
/// for the client to make use of the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Protocol version echoed by the server
    #[serde(default)]
    pub jsonrpc: String,
    /// Id of the request this answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Successful result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    /// Interpret a decoded JSON value as a response.
    ///
    /// Returns `None` if the value is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Take the result, discarding any error object
    pub fn into_result(self) -> Option<Value> {
        if let Some(ref error) = self.error {
            tracing::debug!(code = error.code, "Server returned error: {}", error.message);
        }
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_params() {
        let client = ClientInfo::new("playwright-rl", "0.1.0");
        let request = Request::initialize(1, PROTOCOL_VERSION, &client);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 1);
        assert_eq!(value["method"], "initialize");
        assert_eq!(value["params"]["protocolVersion"], "2024-11-05");
        assert_eq!(value["params"]["capabilities"], json!({}));
        assert_eq!(value["params"]["clientInfo"]["name"], "playwright-rl");
        assert_eq!(value["params"]["clientInfo"]["version"], "0.1.0");
    }

    #[test]
    fn test_notification_omits_id() {
        let request = Request::initialized();
        assert!(request.is_notification());

        let encoded = serde_json::to_string(&request).unwrap();
        assert!(!encoded.contains("\"id\""));
        assert_eq!(
            serde_json::from_str::<Value>(&encoded).unwrap(),
            json!({"jsonrpc": "2.0", "method": "initialized", "params": {}})
        );
    }

    #[test]
    fn test_tools_call_params() {
        let request = Request::tools_call(7, "browser_click", json!({"ref": "e3"}));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["method"], "tools/call");
        assert_eq!(value["params"]["name"], "browser_click");
        assert_eq!(value["params"]["arguments"]["ref"], "e3");
    }

    #[test]
    fn test_response_error_has_no_result() {
        let value = json!({
            "jsonrpc": "2.0",
            "id": 2,
            "error": {"code": -32601, "message": "Method not found"}
        });
        let response = Response::from_value(value).unwrap();
        assert_eq!(response.error.as_ref().unwrap().code, -32601);
        assert!(response.into_result().is_none());
    }

    #[test]
    fn test_response_from_non_object() {
        assert!(Response::from_value(json!([1, 2, 3])).is_none());
        assert!(Response::from_value(json!("text")).is_none());
    }
}
