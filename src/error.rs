//! Error types and constructors.
//!
//! Library operations fail with [`EngineError`], one variant per failure kind
//! of the query pipeline. The engine facade turns every one of them into a
//! failed [`EngineResponse`](crate::engine::EngineResponse); the binary maps
//! whatever is left into [`AppError`] for process-level reporting.

pub use masterror::{AppError, AppResult};
use thiserror::Error;

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Failure kinds of the natural-language query pipeline.
///
/// Every variant keeps the original driver / provider message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Database unreachable or authentication rejected
    #[error("Connection error: {0}")]
    Connection(String),
    /// Schema enumeration failed on an established connection
    #[error("Schema introspection failed: {0}")]
    Introspection(String),
    /// Language-model call failed or returned unusable content
    #[error("{0}")]
    Generation(String),
    /// SQL execution failed (syntax, permissions, constraints)
    #[error("Database error: {0}")]
    Execution(String),
    /// Missing or invalid setting
    #[error("Configuration error: {0}")]
    Configuration(String)
}

impl EngineError {
    /// Short label of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Introspection(_) => "introspection",
            Self::Generation(_) => "generation",
            Self::Execution(_) => "execution",
            Self::Configuration(_) => "configuration"
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::Connection(_) | EngineError::Generation(_) => {
                AppError::service(err.to_string())
            }
            EngineError::Configuration(_) => AppError::bad_request(err.to_string()),
            EngineError::Introspection(_) | EngineError::Execution(_) => {
                AppError::internal(err.to_string())
            }
        }
    }
}

impl From<mysql_async::Error> for EngineError {
    fn from(err: mysql_async::Error) -> Self {
        match err {
            mysql_async::Error::Io(_) | mysql_async::Error::Url(_) => {
                Self::Connection(err.to_string())
            }
            _ => Self::Execution(err.to_string())
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Execution(err.to_string())
    }
}

/// Create terminal I/O error
pub fn io_error(context: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to {}: {}", context, source))
}

/// Create LLM API error
pub fn llm_api_error(message: impl Into<String>) -> EngineError {
    EngineError::Generation(message.into())
}

/// Create HTTP error
pub fn http_error(err: reqwest::Error) -> EngineError {
    let msg = if err.is_timeout() {
        format!("Request timeout: {}", err)
    } else if err.is_connect() {
        format!("Network error calling language model: {}", err)
    } else if err.is_decode() {
        format!("Unexpected language model response format: {}", err)
    } else if err.is_status() {
        format!("HTTP error {}: {}", err.status().unwrap_or_default(), err)
    } else {
        err.to_string()
    };
    EngineError::Generation(msg)
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> EngineError {
    EngineError::Configuration(message.into())
}

/// Create introspection error
pub fn introspection_error(message: impl Into<String>) -> EngineError {
    EngineError::Introspection(message.into())
}

/// Create execution error
pub fn execution_error(message: impl Into<String>) -> EngineError {
    EngineError::Execution(message.into())
}

/// Create connection error
pub fn connection_error(message: impl Into<String>) -> EngineError {
    EngineError::Connection(message.into())
}
