//! User lookup seam used by the multi-user editor

use async_trait::async_trait;

use crate::error::LookupError;
use crate::model::User;

/// Source of users for the multi-user picker.
///
/// Implemented by [`TaskGridClient`](crate::TaskGridClient); tests and
/// offline hosts can provide their own.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Searches users. An empty query returns the directory's default list.
    async fn search_users(&self, query: &str) -> Result<Vec<User>, LookupError>;
}
