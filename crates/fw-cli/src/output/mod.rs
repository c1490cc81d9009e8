//! Output formatting utilities for the CLI
//!
//! Tables for tool listings and episode steps, and colored status
//! messages.

use std::io::Write;

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use tabled::{
    settings::{Style, Width},
    Table, Tabled,
};

use fw_core::{Action, Transition};
use fw_protocol::ToolDescriptor;

/// Format the server's tools as an ASCII table.
///
/// The detailed view adds the argument names taken from each tool's input
/// schema.
pub fn format_tools(tools: &[ToolDescriptor], detailed: bool) -> String {
    if tools.is_empty() {
        return "No tools offered".to_string();
    }

    #[derive(Tabled)]
    struct ToolRow {
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "DESCRIPTION")]
        description: String,
    }

    #[derive(Tabled)]
    struct ToolRowDetailed {
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "ARGUMENTS")]
        arguments: String,
        #[tabled(rename = "DESCRIPTION")]
        description: String,
    }

    let description = |tool: &ToolDescriptor, max_len: usize| {
        tool.description
            .as_deref()
            .map(|d| truncate(d.lines().next().unwrap_or(""), max_len))
            .unwrap_or_else(|| "-".to_string())
    };

    if detailed {
        let rows: Vec<ToolRowDetailed> = tools
            .iter()
            .map(|t| ToolRowDetailed {
                name: t.name.clone(),
                arguments: argument_names(t),
                description: description(t, 120),
            })
            .collect();

        Table::new(rows)
            .with(Style::rounded())
            .with(Width::wrap(120))
            .to_string()
    } else {
        let rows: Vec<ToolRow> = tools
            .iter()
            .map(|t| ToolRow {
                name: t.name.clone(),
                description: description(t, 60),
            })
            .collect();

        Table::new(rows).with(Style::rounded()).to_string()
    }
}

/// Format the steps of an episode as an ASCII table
pub fn format_steps(steps: &[(Action, Transition)]) -> String {
    #[derive(Tabled)]
    struct StepRow {
        #[tabled(rename = "STEP")]
        step: u32,
        #[tabled(rename = "ACTION")]
        action: String,
        #[tabled(rename = "TARGET")]
        target: String,
        #[tabled(rename = "REWARD")]
        reward: String,
        #[tabled(rename = "DONE")]
        done: bool,
    }

    let rows: Vec<StepRow> = steps
        .iter()
        .map(|(action, transition)| StepRow {
            step: transition.info.step,
            action: action.kind().to_string(),
            target: action_target(action),
            reward: format!("{:+.2}", transition.reward),
            done: transition.done,
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

fn action_target(action: &Action) -> String {
    match action {
        Action::Click { element_ref, .. } | Action::Submit { element_ref, .. } => {
            element_ref.clone()
        }
        Action::Type {
            element_ref, text, ..
        } => format!("{} <- {:?}", element_ref, text),
        Action::Wait { time: Some(t) } => format!("{}s", t),
        Action::Wait { time: None } => "-".to_string(),
    }
}

fn argument_names(tool: &ToolDescriptor) -> String {
    let names: Vec<&str> = tool
        .input_schema
        .get("properties")
        .and_then(|p| p.as_object())
        .map(|p| p.keys().map(String::as_str).collect())
        .unwrap_or_default();

    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

/// Truncate a string with ellipsis if too long
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn print_marked(mut out: impl Write, color: Color, mark: &str, msg: &str) {
    let _ = crossterm::execute!(
        out,
        SetForegroundColor(color),
        Print(mark),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    print_marked(std::io::stdout(), Color::Green, "✓ ", msg);
}

/// Print an error message to stderr in red with an X prefix
pub fn print_error(msg: &str) {
    print_marked(std::io::stderr(), Color::Red, "✗ ", msg);
}

/// Print a warning message to stderr in yellow
pub fn print_warning(msg: &str) {
    print_marked(std::io::stderr(), Color::Yellow, "⚠ ", msg);
}

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    print_marked(std::io::stdout(), Color::Cyan, "ℹ ", msg);
}
