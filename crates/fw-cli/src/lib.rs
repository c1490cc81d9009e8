//! formwright: Command-line interface for Formwright
//!
//! Provides the `formwright` CLI for inspecting an MCP tool server and
//! running scripted form-filling episodes against it.

pub mod commands;
pub mod output;
