//! Error types for fairval.

use thiserror::Error;

/// Result type alias using the fairval error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for configuration loading and the command-line surface.
///
/// Model evaluation never produces this type: per-model failures are values
/// of the engine's own `ValuationError` and are reported inside the report.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration loaded but failed validation
    #[error("Invalid configuration: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// Invalid input (malformed snapshot document, unknown model name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Process exit code for the command-line binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) => 78,
            Self::InvalidInput(_) | Self::Json(_) => 65,
            Self::Io(_) => 74,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

/// Extension trait for adding context to any error type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
