//! Rarity service error types

use shared::SharedError;
use std::time::Duration;
use thiserror::Error;

/// Low-level failure reported by an embedded runtime or package installer
///
/// The gateway classifies these into [`RarityError`] variants depending on
/// which lifecycle step produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RuntimeFailure {
    pub message: String,
}

impl RuntimeFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<std::io::Error> for RuntimeFailure {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum RarityError {
    #[error("Failed to load runtime: {message}")]
    RuntimeBootstrap { message: String },

    #[error("Failed to load package {package}: {message}")]
    PackageInstall { package: String, message: String },

    #[error("Script execution failed: {message}")]
    Execution { message: String },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout { operation: String, timeout: Duration },

    #[error("Unusable ranking result: {message}")]
    InvalidResult { message: String },

    #[error("Failed to compute rarity: {0}")]
    RarityComputation(#[source] Box<RarityError>),

    #[error("Rarities not computed yet, please call get_all_rarities first")]
    NoRaritiesComputed,

    #[error("Configuration error: {field} = {value}")]
    Configuration { field: String, value: String },

    #[error("Failed to read metadata from {path}: {message}")]
    Metadata { path: String, message: String },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RarityError {
    /// Wrap any failure of a ranking request in the umbrella variant
    pub fn computation(cause: RarityError) -> Self {
        match cause {
            already @ RarityError::RarityComputation(_) => already,
            other => RarityError::RarityComputation(Box::new(other)),
        }
    }

    pub fn invalid_result(message: impl Into<String>) -> Self {
        RarityError::InvalidResult { message: message.into() }
    }

    pub fn config(field: impl Into<String>, value: impl Into<String>) -> Self {
        RarityError::Configuration {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Innermost error beneath any umbrella wrapping
    pub fn root_cause(&self) -> &RarityError {
        match self {
            RarityError::RarityComputation(cause) => cause.root_cause(),
            other => other,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.root_cause(), RarityError::Timeout { .. })
    }

    /// Stable error code for callers that match on strings
    pub fn code(&self) -> &'static str {
        match self {
            RarityError::RuntimeBootstrap { .. } => "RUNTIME_LOAD_FAILED",
            RarityError::PackageInstall { .. } => "PACKAGE_LOAD_FAILED",
            RarityError::Execution { .. } => "EXECUTION_FAILED",
            RarityError::Timeout { .. } => "TIMEOUT",
            RarityError::InvalidResult { .. }
            | RarityError::RarityComputation(_)
            | RarityError::Json(_) => "RARITY_COMPUTATION_FAILED",
            RarityError::NoRaritiesComputed => "NO_RARITIES_COMPUTED",
            RarityError::Configuration { .. } => "CONFIGURATION_ERROR",
            RarityError::Metadata { .. } | RarityError::Shared(_) | RarityError::Io(_) => "METADATA_ERROR",
        }
    }
}

pub type RarityResult<T> = Result<T, RarityError>;
