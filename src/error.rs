//! Error types for the engine.
//!
//! Every enum implements [`ErrorCode`] so a host can report a stable code
//! alongside the human-readable message.

/// Stable machine-readable code for an error value.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

/// Failure to resolve or build a filter from its persisted record.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("unknown filter id: {0}")]
    UnknownId(String),
    #[error("invalid filter record: {0}")]
    InvalidRecord(String),
    #[error("filter already registered: {0}")]
    AlreadyRegistered(String),
}

impl ErrorCode for FilterError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownId(_) => "E_FILTER_UNKNOWN",
            Self::InvalidRecord(_) => "E_FILTER_INVALID",
            Self::AlreadyRegistered(_) => "E_FILTER_DUPLICATE",
        }
    }
}

/// Failure while compositing onto a destination surface.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch { expected: (u32, u32), actual: (u32, u32) },
}

impl ErrorCode for RenderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SizeMismatch { .. } => "E_SURFACE_SIZE",
        }
    }
}

/// Failure to parse or validate an [`crate::config::EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_CONFIG_PARSE",
            Self::Invalid(_) => "E_CONFIG_INVALID",
        }
    }
}

/// Failure to load elements into a [`crate::doc::DocStore`].
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("element json invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid element {0}")]
    InvalidElement(String),
}

impl ErrorCode for DocError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Json(_) => "E_DOC_JSON",
            Self::InvalidElement(_) => "E_DOC_INVALID",
        }
    }
}
