//! fw-protocol: Wire protocol for Formwright tool sessions
//!
//! This crate defines the JSON-RPC 2.0 messages exchanged with a Model
//! Context Protocol tool server over HTTP, and the Server-Sent-Events
//! framing the server wraps its replies in.

pub mod codec;
pub mod error;
pub mod message;
pub mod session;
pub mod tool;

pub use codec::{encode_message, first_message, SseCodec};
pub use error::ProtocolError;
pub use message::{ClientInfo, Request, Response, RpcError, JSONRPC_VERSION, PROTOCOL_VERSION};
pub use session::{SessionId, SESSION_HEADER};
pub use tool::{ToolDescriptor, ToolOutput};
