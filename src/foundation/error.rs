use std::path::PathBuf;

/// Convenience result type used across gifbar.
pub type GifbarResult<T> = Result<T, GifbarError>;

/// Top-level error taxonomy used by the pipeline and batch APIs.
#[derive(thiserror::Error, Debug)]
pub enum GifbarError {
    /// Run-level misconfiguration (for example, no frame handlers registered).
    #[error("configuration error: {0}")]
    Config(String),

    /// The input path did not exist when the pipeline was constructed.
    #[error("source not found: {}", path.display())]
    SourceNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// Temp cache creation or disk writes failed.
    #[error("resource error: {0}")]
    Resource(String),

    /// The source could not be decoded as an animated GIF.
    #[error("decode error: {0}")]
    Decode(String),

    /// The codec refused the frame sequence.
    #[error("encode error: {0}")]
    Encode(String),

    /// Invalid option values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GifbarError {
    /// Build a [`GifbarError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`GifbarError::SourceNotFound`] value.
    pub fn source_not_found(path: impl Into<PathBuf>) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    /// Build a [`GifbarError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`GifbarError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`GifbarError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`GifbarError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// `true` when the error must abort a whole run rather than a single file.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
