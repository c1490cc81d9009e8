//! Session client for MCP tool servers

mod mcp;

pub use mcp::McpClient;
