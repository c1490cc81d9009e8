//! HTTP session client for a Model Context Protocol server
//!
//! Every exchange is a single POST to the configured endpoint. The server
//! replies with an SSE-framed body whose first `data:` line holds the
//! JSON-RPC response; any further lines are ignored.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;

use fw_core::config::ClientConfig;
use fw_core::error::ConnectionError;
use fw_core::ToolTransport;
use fw_protocol::{
    first_message, ClientInfo, Request, Response, SessionId, ToolDescriptor, ToolOutput,
    SESSION_HEADER,
};

/// Media types accepted in replies
const ACCEPT_TYPES: &str = "application/json, text/event-stream";

/// Client for a single MCP endpoint.
///
/// The session identifier is learned from the first response that carries
/// one and sent with every request after that. Methods take `&mut self`, so
/// a client never has two requests in flight.
pub struct McpClient {
    http: reqwest::Client,
    endpoint: String,
    client_info: ClientInfo,
    protocol_version: String,
    request_timeout: Duration,
    session_id: Option<SessionId>,
    initialized: bool,
    closed: bool,
    next_id: u64,
}

/// Status and first decoded message of one HTTP exchange
struct Exchange {
    status: StatusCode,
    message: Option<Value>,
}

impl Exchange {
    /// The JSON-RPC `result`, if the exchange produced one
    fn into_result(self) -> Option<Value> {
        if !self.status.is_success() {
            tracing::debug!("Server replied with HTTP {}", self.status);
            return None;
        }
        Response::from_value(self.message?)?.into_result()
    }
}

impl McpClient {
    /// Create a client without contacting the server
    pub fn new(config: &ClientConfig) -> Result<Self, ConnectionError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConnectionError::Http(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            client_info: ClientInfo::new(&config.client_name, &config.client_version),
            protocol_version: config.protocol_version.clone(),
            request_timeout: config.request_timeout,
            session_id: None,
            initialized: false,
            closed: false,
            next_id: 1,
        })
    }

    /// Create a client and perform the handshake
    pub async fn connect(config: &ClientConfig) -> Result<Self, ConnectionError> {
        let mut client = Self::new(config)?;
        client.initialize().await?;
        Ok(client)
    }

    /// Endpoint every request is sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Session identifier assigned by the server, once known
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Whether the handshake has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Perform the `initialize` / `initialized` handshake.
    ///
    /// A non-success status fails with [`ConnectionError::HandshakeRejected`]
    /// and leaves the client uninitialized.
    pub async fn initialize(&mut self) -> Result<(), ConnectionError> {
        let id = self.next_request_id();
        let request = Request::initialize(id, &self.protocol_version, &self.client_info);
        let exchange = self.post(&request).await?;

        if !exchange.status.is_success() {
            tracing::warn!("Initialize rejected by {}: HTTP {}", self.endpoint, exchange.status);
            return Err(ConnectionError::HandshakeRejected {
                status: exchange.status.as_u16(),
            });
        }

        self.post(&Request::initialized()).await?;
        self.initialized = true;

        match &self.session_id {
            Some(id) => tracing::info!("Session {} initialized with {}", id, self.endpoint),
            None => tracing::info!("Initialized with {} (no session id)", self.endpoint),
        }
        Ok(())
    }

    /// Invoke a tool.
    ///
    /// Returns `Ok(None)` when the server answers without a usable result.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<Option<ToolOutput>, ConnectionError> {
        self.ensure_initialized().await?;

        let id = self.next_request_id();
        let exchange = self.post(&Request::tools_call(id, name, arguments)).await?;

        let output = exchange.into_result().map(ToolOutput::from_result);
        if output.is_none() {
            tracing::debug!("Tool {} produced no result", name);
        }
        Ok(output)
    }

    /// List the tools the server offers
    pub async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, ConnectionError> {
        self.ensure_initialized().await?;

        let id = self.next_request_id();
        let exchange = self.post(&Request::tools_list(id)).await?;

        Ok(exchange
            .into_result()
            .map(|result| ToolDescriptor::list_from_result(&result))
            .unwrap_or_default())
    }

    /// Close the client. Safe to call more than once.
    pub async fn close(&mut self) -> Result<(), ConnectionError> {
        if !self.closed {
            tracing::debug!("Closing session client for {}", self.endpoint);
        }
        self.closed = true;
        self.initialized = false;
        Ok(())
    }

    async fn ensure_initialized(&mut self) -> Result<(), ConnectionError> {
        if self.closed {
            return Err(ConnectionError::Closed);
        }
        if !self.initialized {
            self.initialize().await?;
        }
        Ok(())
    }

    fn next_request_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// POST one JSON-RPC message and decode the first message of the reply
    async fn post(&mut self, request: &Request) -> Result<Exchange, ConnectionError> {
        if self.closed {
            return Err(ConnectionError::Closed);
        }

        let mut builder = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, ACCEPT_TYPES)
            .json(request);
        if let Some(id) = &self.session_id {
            builder = builder.header(SESSION_HEADER, id.as_str());
        }

        tracing::debug!("-> {} (id {:?})", request.method, request.id);
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();

        if self.session_id.is_none() {
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)));
            if let Some(id) = SessionId::from_headers(headers) {
                tracing::debug!("Server assigned session {}", id);
                self.session_id = Some(id);
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        let message = match first_message(&body) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("Undecodable reply to {}: {}", request.method, e);
                None
            }
        };
        tracing::debug!("<- HTTP {} for {}", status, request.method);

        Ok(Exchange { status, message })
    }

    fn transport_error(&self, err: reqwest::Error) -> ConnectionError {
        if err.is_timeout() {
            ConnectionError::Timeout(self.request_timeout)
        } else {
            ConnectionError::Http(err.to_string())
        }
    }
}

#[async_trait]
impl ToolTransport for McpClient {
    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<Option<ToolOutput>, ConnectionError> {
        McpClient::call_tool(self, name, arguments).await
    }

    async fn close(&mut self) -> Result<(), ConnectionError> {
        McpClient::close(self).await
    }
}
