//! Storage types shared by all backends.

use serde::{Deserialize, Serialize};

/// Number of rows returned by a list when the caller does not say otherwise.
pub const DEFAULT_LIST_LIMIT: usize = 1000;

/// Window over a table listing.
///
/// Rows come back in the backend's natural order (insertion order for the
/// in-memory store, heap order for PostgreSQL). No ordering is guaranteed
/// beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    pub skip: usize,
    pub limit: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ListParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Everything, for internal child lookups.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            skip: 0,
            limit: usize::MAX,
        }
    }
}
