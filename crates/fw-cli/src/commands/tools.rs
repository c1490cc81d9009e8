//! Tools command implementation

use anyhow::{Context, Result};

use crate::output::{format_tools, print_error};
use fw_core::config::ClientConfig;
use fw_env::McpClient;

/// List the tools offered by the server
pub async fn tools_command(config: &ClientConfig, detailed: bool) -> Result<()> {
    let mut client = match McpClient::connect(config).await {
        Ok(client) => client,
        Err(e) => {
            print_error(&format!("Failed to connect to {}: {}", config.endpoint, e));
            print_error("Is the MCP server running? Try: npx @playwright/mcp --port 8931");
            return Err(e.into());
        }
    };

    let tools = client
        .list_tools()
        .await
        .with_context(|| "Failed to list tools")?;
    client.close().await?;

    println!("{}", format_tools(&tools, detailed));
    Ok(())
}
