//! Session client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs_f64;
use fw_protocol::PROTOCOL_VERSION;

/// Configuration for the tool server session client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Tool server endpoint (a single URL every request is POSTed to)
    pub endpoint: String,

    /// Client name announced in the handshake
    pub client_name: String,

    /// Client version announced in the handshake
    pub client_version: String,

    /// Protocol revision requested in the handshake
    pub protocol_version: String,

    /// Upper bound on each HTTP round trip
    #[serde(with = "duration_secs_f64")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8931/mcp".to_string(),
            client_name: "playwright-rl".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Default configuration pointed at another endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}
