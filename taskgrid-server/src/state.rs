//! Shared application state

use crate::cache::JsonCache;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::rate_limit::RateLimiter;
use crate::services::TaskService;
use crate::services::UserService;
use crate::services::mock;

/// Everything a request handler can reach.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub tasks: TaskService,
    pub users: UserService,
    pub limiter: RateLimiter,
}

impl AppState {
    /// Builds the services over the seed data. Both services share one cache.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let cache = JsonCache::in_memory(config.cache.clone());
        let users = mock::users();
        let tasks = TaskService::new(mock::tasks(&users)?, cache.clone());

        Ok(Self {
            tasks,
            users: UserService::new(users, cache),
            limiter: RateLimiter::new(config.rate_limit.clone()),
            config,
        })
    }
}
