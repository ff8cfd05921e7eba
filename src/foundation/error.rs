/// Convenience result type used across textreel.
pub type TextreelResult<T> = Result<T, TextreelError>;

/// Top-level error taxonomy used by engine, capture and export APIs.
///
/// An unavailable surface is deliberately absent: engine and capture start treat it as a
/// silent no-op rather than a failure.
#[derive(thiserror::Error, Debug)]
pub enum TextreelError {
    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// The host cannot produce a stream with the requested codec/bitrate.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// An operation was requested in a state that does not allow it.
    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Errors while drawing onto a surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors reported by a stream encoder.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors while persisting an artifact.
    #[error("export error: {0}")]
    Export(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TextreelError {
    /// Build a [`TextreelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TextreelError::UnsupportedEncoding`] value.
    pub fn unsupported_encoding(msg: impl Into<String>) -> Self {
        Self::UnsupportedEncoding(msg.into())
    }

    /// Build a [`TextreelError::InvalidStateTransition`] value.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    /// Build a [`TextreelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TextreelError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`TextreelError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`TextreelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
