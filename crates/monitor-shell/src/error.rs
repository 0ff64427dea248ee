use thiserror::Error;

/// Failure reported by a host operation (IPC call into the native shell).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("{0}")]
    Failed(String),
    #[error("workspace disconnected: {0}")]
    Disconnected(String),
    #[error("invalid host response: {0}")]
    InvalidResponse(String),
}

impl HostError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Human-readable text shown to the user and written to the debug log.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortcutParseError {
    #[error("shortcut must not be empty")]
    Empty,
    #[error("unknown shortcut modifier `{0}`")]
    UnknownModifier(String),
    #[error("shortcut `{0}` must name exactly one key")]
    KeyCount(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got `{value}`")]
    InvalidNumber { key: &'static str, value: String },
    #[error("invalid shell config: {0}")]
    InvalidToml(String),
    #[error("invalid new agent shortcut: {0}")]
    InvalidShortcut(#[from] ShortcutParseError),
}
