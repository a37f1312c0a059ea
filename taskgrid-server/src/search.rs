//! Token index for user search

use std::collections::HashSet;

const MIN_TOKEN_LEN: usize = 2;
const MIN_PREFIX_LEN: usize = 3;

const EXACT_SCORE: u32 = 10;
const PREFIX_SCORE: u32 = 5;
const SUBSTRING_SCORE: u32 = 1;

/// Lowercases, trims and collapses runs of whitespace to one space.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Items with the set of search tokens derived from their fields.
///
/// Tokens shorter than two characters are skipped. Each token longer than
/// three characters also contributes its prefixes from length three up to,
/// but excluding, its full length.
#[derive(Debug, Clone)]
pub struct SearchIndex<T> {
    entries: Vec<(T, HashSet<String>)>,
}

impl<T: Clone> SearchIndex<T> {
    /// Indexes `items` over the fields returned by `fields`.
    pub fn new<F>(items: &[T], fields: F) -> Self
    where
        F: Fn(&T) -> Vec<String>,
    {
        let entries = items
            .iter()
            .map(|item| {
                let mut tokens = HashSet::new();
                for field in fields(item) {
                    for token in normalize_text(&field).split(' ') {
                        let chars: Vec<char> = token.chars().collect();
                        if chars.len() < MIN_TOKEN_LEN {
                            continue;
                        }
                        for end in MIN_PREFIX_LEN..chars.len() {
                            tokens.insert(chars[..end].iter().collect());
                        }
                        tokens.insert(token.to_string());
                    }
                }
                (item.clone(), tokens)
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tokens indexed for the item at `index`.
    pub fn tokens(&self, index: usize) -> Option<&HashSet<String>> {
        self.entries.get(index).map(|(_, tokens)| tokens)
    }

    /// Returns up to `limit` items ranked by score.
    ///
    /// Each query token scores 10 on an exact token match, else 5 if it
    /// prefixes a token, else 1 if it occurs inside one. Items scoring zero
    /// are dropped. Ties keep index order. A query with no usable tokens
    /// returns the first `limit` items.
    pub fn search(&self, query: &str, limit: usize) -> Vec<T> {
        let normalized = normalize_text(query);
        let query_tokens: Vec<&str> = normalized
            .split(' ')
            .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
            .collect();

        if query_tokens.is_empty() {
            return self
                .entries
                .iter()
                .take(limit)
                .map(|(item, _)| item.clone())
                .collect();
        }

        let mut scored: Vec<(u32, &T)> = self
            .entries
            .iter()
            .filter_map(|(item, tokens)| {
                let score: u32 = query_tokens.iter().map(|q| score_token(q, tokens)).sum();
                (score > 0).then_some((score, item))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, item)| item.clone())
            .collect()
    }
}

fn score_token(query: &str, tokens: &HashSet<String>) -> u32 {
    if tokens.contains(query) {
        EXACT_SCORE
    } else if tokens.iter().any(|t| t.starts_with(query)) {
        PREFIX_SCORE
    } else if tokens.iter().any(|t| t.contains(query)) {
        SUBSTRING_SCORE
    } else {
        0
    }
}
