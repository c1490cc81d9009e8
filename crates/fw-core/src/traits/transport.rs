//! Tool transport trait

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ConnectionError;
use fw_protocol::ToolOutput;

/// Something that can invoke named remote tools.
///
/// `Ok(None)` means the call reached the transport but produced no usable
/// result (a JSON-RPC error, an unparseable reply, a reply with no data
/// lines). `Err` is reserved for failures of the transport itself.
#[async_trait]
pub trait ToolTransport: Send {
    /// Invoke `name` with `arguments`
    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<Option<ToolOutput>, ConnectionError>;

    /// Release the transport.
    ///
    /// Calls made after `close` fail with [`ConnectionError::Closed`].
    async fn close(&mut self) -> Result<(), ConnectionError>;
}

#[async_trait]
impl<T: ToolTransport + ?Sized> ToolTransport for Box<T> {
    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<Option<ToolOutput>, ConnectionError> {
        (**self).call_tool(name, arguments).await
    }

    async fn close(&mut self) -> Result<(), ConnectionError> {
        (**self).close().await
    }
}
