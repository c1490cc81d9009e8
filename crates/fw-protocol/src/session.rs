//! Session identifier type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Header carrying the session identifier, in canonical lower-case form.
///
/// Servers are free to choose any capitalization when sending it; the
/// client always writes it back under this name.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Opaque token binding requests to server-side session state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Find the session identifier among response headers.
    ///
    /// Header names are compared case-insensitively. Blank values are
    /// treated as absent.
    pub fn from_headers<'a, I>(headers: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        headers
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(SESSION_HEADER))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(Self::new)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
