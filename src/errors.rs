//! Application error types
//!
//! One enum per concern boundary lives next to its service; this is the
//! pipeline-level error that everything converges to before the outer
//! HTTP boundary turns it into an opaque 500.

use thiserror::Error;

use crate::services::email::EmailError;
use crate::services::rate_limiter::LimiterError;
use crate::services::search::SearchError;
use crate::services::video::VideoError;

/// Result type for pipeline and handler operations
pub type AppResult<T> = Result<T, AppError>;

/// Errors that can escape the middleware pipeline or a route handler
#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("rate limiter failure: {0}")]
    Limiter(#[from] LimiterError),

    #[error("video service failure: {0}")]
    Video(#[from] VideoError),

    #[error("search service failure: {0}")]
    Search(#[from] SearchError),

    #[error("email service failure: {0}")]
    Email(#[from] EmailError),

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a configuration error
    pub fn config<T: Into<String>>(message: T) -> Self {
        AppError::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<T: Into<String>>(message: T) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
