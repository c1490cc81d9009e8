//! Core trait definitions

mod environment;
mod transport;

pub use environment::Environment;
pub use transport::ToolTransport;
