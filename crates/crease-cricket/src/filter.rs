// Search, category filtering and pagination over the table views.
//
// Matching is case-insensitive substring matching on trimmed queries; an
// empty query matches everything.

use crease_core::model::{Category, LeaderboardEntry, Player};

use crate::selection::SelectedPlayer;

/// Rows per leaderboard page.
pub const LEADERBOARD_PAGE_SIZE: usize = 5;

fn matches_query(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Category filter
// ---------------------------------------------------------------------------

/// Category filter of the players table. `None` means "All".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryFilter(pub Option<Category>);

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        self.0.is_none_or(|c| c == category)
    }

    /// All -> Batsman -> All-Rounder -> Bowler -> All.
    pub fn next(self) -> Self {
        CategoryFilter(match self.0 {
            None => Some(Category::Batsman),
            Some(Category::Batsman) => Some(Category::AllRounder),
            Some(Category::AllRounder) => Some(Category::Bowler),
            Some(Category::Bowler) => None,
        })
    }

    pub fn label(&self) -> &'static str {
        self.0.map_or("All", |c| c.label())
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Players whose name contains `query` and whose category passes `category`.
pub fn filter_players<'a>(
    players: &'a [Player],
    query: &str,
    category: CategoryFilter,
) -> Vec<&'a Player> {
    let needle = normalize(query);
    players
        .iter()
        .filter(|p| category.matches(p.category) && matches_query(&p.name, &needle))
        .collect()
}

/// Team members matching `query` on name, university or category.
pub fn filter_team<'a>(members: &'a [SelectedPlayer], query: &str) -> Vec<&'a SelectedPlayer> {
    let needle = normalize(query);
    members
        .iter()
        .filter(|m| {
            matches_query(&m.player.name, &needle)
                || matches_query(&m.player.university, &needle)
                || matches_query(m.player.category.label(), &needle)
        })
        .collect()
}

/// Leaderboard rows whose username contains `query`.
pub fn filter_leaderboard<'a>(
    rows: &'a [LeaderboardEntry],
    query: &str,
) -> Vec<&'a LeaderboardEntry> {
    let needle = normalize(query);
    rows.iter()
        .filter(|r| matches_query(&r.username, &needle))
        .collect()
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of a filtered list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Zero-based page index, clamped into range.
    pub index: usize,
    /// Always at least 1, even for an empty list.
    pub total_pages: usize,
    /// Index of `items[0]` in the full list (for rank numbers).
    pub offset: usize,
}

pub fn total_pages(len: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    len.div_ceil(per_page).max(1)
}

/// Slice `items` into the `index`-th page. Out-of-range indexes show the
/// last page.
pub fn paginate<T>(items: &[T], index: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total_pages = total_pages(items.len(), per_page);
    let index = index.min(total_pages - 1);
    let offset = index * per_page;
    let end = (offset + per_page).min(items.len());
    Page {
        items: &items[offset.min(items.len())..end],
        index,
        total_pages,
        offset,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
