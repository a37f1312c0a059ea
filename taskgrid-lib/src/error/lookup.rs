//! User lookup errors

use super::ApiError;

/// A user search failed.
///
/// Shown inline by the multi-user editor; the field stays editable.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The directory call itself failed.
    #[error("user lookup failed: {0}")]
    Api(#[from] ApiError),

    /// The directory is not reachable for another reason.
    #[error("user lookup unavailable: {0}")]
    Unavailable(String),
}
