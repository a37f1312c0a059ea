//! Page-level load state

/// Message shown when the table cannot be loaded.
pub const TASKS_LOAD_FAILED: &str = "Failed to load tasks data. Please try again later.";

/// Load state of a whole page.
///
/// A failure is final until the user retries; nothing retries on its own.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState<T> {
    #[default]
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> FetchState<T> {
    /// Maps a fetch result, logging and replacing the error with `message`.
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>, message: &str) -> Self {
        match result {
            Ok(data) => FetchState::Loaded(data),
            Err(e) => {
                log::error!("fetch failed: {}", e);
                FetchState::Failed(message.to_string())
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }
}
