use std::fmt;

/// Error type carried across the sink boundary.
///
/// Wraps a human-readable message describing the failure. This is the
/// error form that reaches script-visible callbacks — the native side
/// flattens its typed errors into a message before handing them to a
/// sink, because the script layer only ever renders them as text.
#[derive(Debug, Clone)]
pub struct StreamError {
    message: String,
}

impl StreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StreamError {}

impl From<String> for StreamError {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for StreamError {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
