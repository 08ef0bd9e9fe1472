/// Convenience result type used across scrubreel.
pub type ScrubResult<T> = Result<T, ScrubError>;

/// Top-level error taxonomy used by renderer APIs.
///
/// Per-frame asset failures never surface through this type at runtime: the frame store absorbs
/// them and records the slot as missing. Errors are returned from construction, configuration and
/// explicit blocking waits only.
#[derive(thiserror::Error, Debug)]
pub enum ScrubError {
    /// Invalid user-provided configuration or geometry.
    #[error("validation error: {0}")]
    Validation(String),

    /// A single frame asset could not be fetched or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Section lifecycle misuse or a wait that did not complete.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrubError {
    /// Build a [`ScrubError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScrubError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`ScrubError::Lifecycle`] value.
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Build a [`ScrubError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
