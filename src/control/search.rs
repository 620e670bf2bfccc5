//! Free-text market matching.
//!
//! Stateless per request: the caller fetches a fresh window and this
//! module reduces it. No ranking or scoring — matches keep their window
//! position, and duplicates in the window stay duplicated.

use crate::types::Market;

/// Case-insensitive substring match over a market window.
///
/// A market matches when the lowercased query appears in its lowercased
/// title or in its search key (display ticker, falling back to the plain
/// ticker). The query is expected to be pre-trimmed and non-empty — the
/// control service validates that before fetching anything.
pub fn match_markets(query: &str, window: &[Market]) -> Vec<Market> {
    let needle = query.to_lowercase();
    window
        .iter()
        .filter(|m| {
            m.title.to_lowercase().contains(&needle)
                || m.search_key().to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
