//! Request validation helpers

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use taskgrid_lib::model::User;

/// Longest accepted search query, in characters.
pub const MAX_QUERY_LEN: usize = 100;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static UNION_SELECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)union\s+select").expect("union pattern is valid"));

/// Length constraints for [`is_valid_string`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StringRules {
    /// Reject empty or whitespace-only values.
    pub required: bool,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
}

impl StringRules {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }
}

/// Checks a string against length rules. Lengths count characters.
pub fn is_valid_string(value: &str, rules: StringRules) -> bool {
    let len = value.chars().count();
    if rules.required && value.trim().is_empty() {
        return false;
    }
    if rules.min_len.is_some_and(|min| len < min) {
        return false;
    }
    if rules.max_len.is_some_and(|max| len > max) {
        return false;
    }
    true
}

pub fn is_valid_email(value: &str) -> bool {
    is_valid_string(value, StringRules::required()) && EMAIL.is_match(value)
}

/// Rejects overlong queries and SQL-looking fragments: `--`, `;`, `/*` and
/// `union select`.
pub fn is_valid_search_query(query: &str) -> bool {
    if query.chars().count() > MAX_QUERY_LEN {
        return false;
    }
    let suspicious = query.contains("--")
        || query.contains(';')
        || query.contains("/*")
        || UNION_SELECT.is_match(query);
    !suspicious
}

/// Validates a user carried in a request body.
///
/// Returns field messages; empty means valid.
pub fn validate_user(user: &User) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    if !is_valid_string(&user.id, StringRules::required()) {
        errors.insert("id".to_string(), "User ID is required".to_string());
    }
    if !is_valid_string(&user.name, StringRules::required().max_len(100)) {
        errors.insert(
            "name".to_string(),
            "Name is required and must be at most 100 characters".to_string(),
        );
    }
    if let Some(email) = &user.email
        && !is_valid_email(email)
    {
        errors.insert("email".to_string(), "Email is invalid".to_string());
    }
    if let Some(avatar) = &user.avatar
        && !is_valid_string(avatar, StringRules::default().max_len(500))
    {
        errors.insert(
            "avatar".to_string(),
            "Avatar URL must be at most 500 characters".to_string(),
        );
    }
    errors
}
