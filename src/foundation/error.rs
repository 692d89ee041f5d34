/// Convenience result type used across wavelock.
pub type WavelockResult<T> = Result<T, WavelockError>;

/// Top-level error taxonomy used by session and component APIs.
#[derive(thiserror::Error, Debug)]
pub enum WavelockError {
    /// Invalid user-provided configuration, detected at session setup.
    #[error("config error in `{field}`: {reason}")]
    Config {
        /// Name of the offending field (dotted path for nested values).
        field: String,
        /// Human-readable reason.
        reason: String,
    },

    /// Unreadable or corrupt audio input.
    #[error("decode error: {0}")]
    Decode(String),

    /// A frame sink refused a frame or failed to start/finish.
    #[error("sink error: {0}")]
    Sink(String),

    /// Errors while compositing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// The session was aborted between frames.
    #[error("render cancelled")]
    Cancelled,

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WavelockError {
    /// Build a [`WavelockError::Config`] value.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`WavelockError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`WavelockError::Sink`] value.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Build a [`WavelockError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`WavelockError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return the offending field name for configuration errors.
    pub fn config_field(&self) -> Option<&str> {
        match self {
            Self::Config { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
