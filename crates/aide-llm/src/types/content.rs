use serde::{Deserialize, Serialize};

/// Text content of a message.
///
/// Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Content(String);

impl Content {
    /// Create text content
    pub fn text(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
