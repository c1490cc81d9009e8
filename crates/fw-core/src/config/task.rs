//! Task configuration
//!
//! Tasks are JSON files describing one form to fill:
//!
//! ```json
//! {
//!   "url": "https://example.com/form",
//!   "field_selector": "#name-input",
//!   "submit_selector": "#submit-btn",
//!   "success_condition": "Thank you",
//!   "max_steps": 50
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Step limit applied when a task does not set one
pub const DEFAULT_MAX_STEPS: u32 = 50;

/// One form-filling task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Page holding the form
    pub url: String,

    /// CSS selector of the input field (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_selector: Option<String>,

    /// CSS selector of the submit button (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_selector: Option<String>,

    /// Text whose appearance (case-insensitive) marks success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_condition: Option<String>,

    /// Maximum steps per episode
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_max_steps() -> u32 {
    DEFAULT_MAX_STEPS
}

impl TaskConfig {
    /// Create a task for `url` with default settings
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            field_selector: None,
            submit_selector: None,
            success_condition: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Set the success marker
    pub fn with_success_condition(mut self, marker: impl Into<String>) -> Self {
        self.success_condition = Some(marker.into());
        self
    }

    /// Set the step limit
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Load and validate a task file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Invalid(format!("Failed to read task file: {}", e)))?;

        let task: Self = serde_json::from_str(&content)?;
        task.validate()?;
        Ok(task)
    }

    /// Check that required fields carry a value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingField("url".to_string()));
        }
        Ok(())
    }
}
