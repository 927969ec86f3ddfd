//! Query parameter types for API handlers.

use serde::Deserialize;
use vinyl_core::search::{
    clamp_limit, clamp_offset, normalize_term, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
};
use vinyl_db::models::vinyl_record::RecordFilter;

/// Gallery listing parameters (`?q=&genre=&limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct RecordListParams {
    /// Free-text search over title, artist and genre.
    pub q: Option<String>,
    /// Exact (case-insensitive) genre filter.
    pub genre: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl RecordListParams {
    /// Normalize into a repository filter: blank terms are dropped and
    /// paging values clamped.
    pub fn into_filter(self) -> RecordFilter {
        RecordFilter {
            query: normalize_term(self.q.as_deref()),
            genre: normalize_term(self.genre.as_deref()),
            limit: clamp_limit(self.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT),
            offset: clamp_offset(self.offset),
        }
    }
}
