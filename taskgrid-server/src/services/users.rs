//! User directory over the seed data

use taskgrid_lib::model::User;

use crate::cache::JsonCache;
use crate::error::AppError;
use crate::search::SearchIndex;
use crate::search::normalize_text;

/// Maximum users returned by a search.
pub const SEARCH_LIMIT: usize = 20;

/// Read-only user directory with a search index.
#[derive(Debug)]
pub struct UserService {
    users: Vec<User>,
    index: SearchIndex<User>,
    cache: JsonCache,
}

impl UserService {
    /// Indexes users by name and email.
    pub fn new(users: Vec<User>, cache: JsonCache) -> Self {
        let index = SearchIndex::new(&users, |user| {
            vec![user.name.clone(), user.email.clone().unwrap_or_default()]
        });
        Self {
            users,
            index,
            cache,
        }
    }

    /// All users in seed order.
    pub fn all(&self) -> &[User] {
        &self.users
    }

    /// Looks up one user.
    pub async fn get(&self, id: &str) -> Result<User, AppError> {
        let key = format!("user:{}", id);
        if let Some(user) = self.cache.get::<User>(&key).await {
            return Ok(user);
        }

        let user = self
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("User with ID {} not found", id)))?;
        self.cache.set(&key, &user).await;
        Ok(user)
    }

    /// Ranked search. An empty query returns the first `limit` users.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<User> {
        if query.is_empty() {
            log::debug!("no search query, returning first {} users", limit);
            return self.users.iter().take(limit).cloned().collect();
        }

        let key = format!("search:users:{}:{}", normalize_text(query), limit);
        if let Some(users) = self.cache.get::<Vec<User>>(&key).await {
            return users;
        }

        let users = self.index.search(query, limit);
        self.cache.set(&key, &users).await;
        users
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::services::mock;

    fn service() -> UserService {
        UserService::new(mock::users(), JsonCache::in_memory(CacheConfig::default()))
    }

    #[tokio::test]
    async fn test_get() {
        let service = service();
        assert_eq!(service.get("2").await.unwrap().name, "Gabriel Lima");
        assert_eq!(service.get("2").await.unwrap().name, "Gabriel Lima");

        let err = service.get("99").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "User with ID 99 not found");
    }

    #[tokio::test]
    async fn test_search() {
        let service = service();
        assert_eq!(service.search("", SEARCH_LIMIT).await.len(), 8);
        assert_eq!(service.search("", 3).await.len(), 3);

        let found = service.search("Singh", SEARCH_LIMIT).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "7");

        let found = service.search("ara", SEARCH_LIMIT).await;
        assert_eq!(found[0].name, "Aram Davtyan");
        assert_eq!(service.search("ara", SEARCH_LIMIT).await, found);
    }
}
