//! Contract with the remote search service and its HTTP implementation.

use std::future::Future;

use serde::Serialize;

use crate::{
    criteria::{SearchCriteria, SortKey},
    error::SearchError,
    models::{Game, GameDetail},
};

/// HTTP client for the search service.
pub mod http;

pub use http::HttpSearchApi;

/// Parameters of one search call, as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// Free-text query.
    pub q: String,
    /// 1-based page index.
    pub page: u32,
    /// Platform filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Genre filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Requested ordering.
    pub sort_by: SortKey,
    /// Minimum rating in stars.
    pub min_rating: f64,
}

impl SearchRequest {
    /// Request for `criteria` at its current page cursor.
    pub fn from_criteria(criteria: &SearchCriteria) -> Self {
        Self {
            q: criteria.query_text.clone(),
            page: criteria.page_cursor,
            platform: criteria.platform.clone(),
            genre: criteria.genre.clone(),
            sort_by: criteria.sort_key,
            min_rating: criteria.min_rating.stars(),
        }
    }

    /// Query parameters in wire order, optional filters omitted when unset.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("q", self.q.clone()), ("page", self.page.to_string())];
        if let Some(platform) = &self.platform {
            pairs.push(("platform", platform.clone()));
        }
        if let Some(genre) = &self.genre {
            pairs.push(("genre", genre.clone()));
        }
        pairs.push(("sort_by", self.sort_by.as_str().to_string()));
        pairs.push(("min_rating", self.min_rating.to_string()));
        pairs
    }
}

/// Remote search service.
///
/// Calls must be idempotent for identical input; the controller may issue
/// duplicates and discard all but the newest response.
pub trait SearchApi: Send + Sync + 'static {
    /// One page of games matching the request. A page shorter than the
    /// configured page size is the final one.
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<Vec<Game>, SearchError>> + Send;

    /// Full record for a single game.
    fn game(&self, id: i64) -> impl Future<Output = Result<GameDetail, SearchError>> + Send;

    /// Platform names available as filters.
    fn platforms(&self) -> impl Future<Output = Result<Vec<String>, SearchError>> + Send;

    /// Genre names available as filters.
    fn genres(&self) -> impl Future<Output = Result<Vec<String>, SearchError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{FilterChange, MinRating};

    #[test]
    fn request_mirrors_criteria_and_omits_unset_filters() {
        let mut criteria = SearchCriteria {
            query_text: "halo".to_string(),
            ..SearchCriteria::default()
        };
        criteria.apply(FilterChange::MinRating(MinRating::from_stars(3.5)));
        criteria.page_cursor = 2;

        let request = SearchRequest::from_criteria(&criteria);
        assert_eq!(
            request.query_pairs(),
            vec![
                ("q", "halo".to_string()),
                ("page", "2".to_string()),
                ("sort_by", "relevance".to_string()),
                ("min_rating", "3.5".to_string()),
            ]
        );

        criteria.apply(FilterChange::Platform(Some("PC".to_string())));
        let pairs = SearchRequest::from_criteria(&criteria).query_pairs();
        assert!(pairs.contains(&("platform", "PC".to_string())));
        assert!(pairs.contains(&("page", "1".to_string())));
    }
}
