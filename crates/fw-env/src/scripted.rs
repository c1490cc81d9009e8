//! Scripted form-filling policy

use fw_core::{Action, Observation};

use crate::refs::find_form_refs;

/// Text typed into the form when none is given
pub const DEFAULT_FILL_TEXT: &str = "John Doe";

/// Fills a single-field form: click the input, type the text, submit.
#[derive(Debug, Clone)]
pub struct ScriptedFormFiller {
    text: String,
}

impl Default for ScriptedFormFiller {
    fn default() -> Self {
        Self::new(DEFAULT_FILL_TEXT)
    }
}

impl ScriptedFormFiller {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Plan the actions for the form in `snapshot`.
    ///
    /// Returns an empty plan when no input field is found. The submit step
    /// is left out when there is no submit control.
    pub fn plan(&self, snapshot: &Observation) -> Vec<Action> {
        let refs = find_form_refs(&snapshot.as_text());
        let Some(input) = refs.input else {
            tracing::warn!("No input field found in snapshot");
            return Vec::new();
        };

        let mut plan = vec![
            Action::click(&input).with_description("input field"),
            Action::type_text(&input, &self.text).with_description("input field"),
        ];
        match refs.submit {
            Some(submit) => plan.push(Action::submit(submit).with_description("submit button")),
            None => tracing::warn!("No submit control found in snapshot"),
        }
        plan
    }
}
