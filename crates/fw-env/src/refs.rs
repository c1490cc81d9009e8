//! Element references in accessibility snapshots
//!
//! Playwright MCP snapshots tag every interactive element with
//! `[ref=<id>]`. Actions address elements by that id.

use once_cell::sync::Lazy;
use regex::Regex;

static REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[ref=([^\]]+)\]").expect("ref pattern is valid"));

/// Refs of the input field and submit control of a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormRefs {
    pub input: Option<String>,
    pub submit: Option<String>,
}

/// Unique element references, in order of first appearance
pub fn extract_refs(snapshot: &str) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    for capture in REF_RE.captures_iter(snapshot) {
        let element_ref = &capture[1];
        if !refs.iter().any(|r| r == element_ref) {
            refs.push(element_ref.to_string());
        }
    }
    refs
}

/// Guess which refs belong to the form's input field and submit control.
///
/// Lines naming a `textbox` (or an `input` with a `name`) are input
/// candidates; lines naming `submit` (or a `button` with a `type`) are
/// submit candidates. The last candidate wins. When nothing matches, the
/// first line with `name=` (input) or with `button`/`submit` (submit) is
/// used instead.
pub fn find_form_refs(snapshot: &str) -> FormRefs {
    let mut refs = FormRefs::default();

    for line in snapshot.lines() {
        let Some(element_ref) = line_ref(line) else {
            continue;
        };
        let lower = line.to_lowercase();

        if lower.contains("textbox") || (lower.contains("input") && lower.contains("name")) {
            refs.input = Some(element_ref.to_string());
        }
        if lower.contains("submit") || (lower.contains("button") && lower.contains("type")) {
            refs.submit = Some(element_ref.to_string());
        }
    }

    if refs.input.is_none() {
        refs.input = first_line_ref(snapshot, |lower| lower.contains("name="));
    }
    if refs.submit.is_none() {
        refs.submit = first_line_ref(snapshot, |lower| {
            lower.contains("button") || lower.contains("submit")
        });
    }

    tracing::debug!("Form refs: input={:?} submit={:?}", refs.input, refs.submit);
    refs
}

fn line_ref(line: &str) -> Option<&str> {
    REF_RE
        .captures(line)
        .and_then(|capture| capture.get(1))
        .map(|m| m.as_str())
}

fn first_line_ref(snapshot: &str, matches: impl Fn(&str) -> bool) -> Option<String> {
    snapshot
        .lines()
        .filter(|line| matches(&line.to_lowercase()))
        .find_map(line_ref)
        .map(str::to_string)
}
