//! Application errors and their JSON form

use std::collections::BTreeMap;

use taskgrid_lib::ApiResponse;

/// Errors returned by request handlers.
///
/// Every variant maps to a status code and the error envelope. Everything
/// except [`AppError::Internal`] is operational: an expected outcome of a bad
/// request rather than a server fault.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request data failed validation.
    #[error("{message}")]
    Validation {
        message: String,
        /// Field-level messages.
        errors: BTreeMap<String, String>,
    },

    /// The resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request body exceeded the size limit.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// The client exceeded its request quota.
    #[error("Too many requests, please try again later")]
    RateLimited,

    /// Unexpected failure.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Creates a validation error with a single field message.
    pub fn validation(
        message: impl Into<String>,
        field: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.into(), detail.into());
        Self::Validation {
            message: message.into(),
            errors,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound(_) => 404,
            Self::PayloadTooLarge => 413,
            Self::RateLimited => 429,
            Self::Internal(_) => 500,
        }
    }

    /// Returns `true` for errors caused by the request rather than the server.
    pub fn is_operational(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// Builds the error envelope. Internal details are not exposed.
    pub fn to_response<T>(&self) -> ApiResponse<T> {
        match self {
            Self::Validation { message, errors } => ApiResponse::Error {
                status_code: self.status_code(),
                message: message.clone(),
                errors: errors.clone(),
            },
            Self::Internal(_) => ApiResponse::error(500, "Internal server error"),
            other => ApiResponse::error(other.status_code(), other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {}", e))
    }
}

/// Errors that stop the server from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    /// The seed table is inconsistent.
    #[error("invalid seed data: {0}")]
    Seed(#[from] taskgrid_lib::error::GridError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
