use std::sync::Arc;

use serde::Serialize;

use crate::{criteria::SearchCriteria, models::Game};

/// Lifecycle of the current search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// No search has been performed.
    #[default]
    Idle,
    /// A first page is being fetched.
    Loading,
    /// A further page is being fetched.
    LoadingMore,
    /// The latest fetch for the current criteria failed.
    Error,
    /// Results for the current criteria (or a cached snapshot) are on display.
    Ready,
}

/// Whether a fetch replaces or extends the accumulated results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Cursor 1 for new criteria; replaces the results.
    Fresh,
    /// Next cursor for unchanged criteria; appends to the results.
    Append,
}

/// Identity of an issued fetch, compared against controller state on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTag {
    /// Criteria generation at issue time; bumped on every non-cursor change.
    pub generation: u64,
    /// Monotonic request number.
    pub request: u64,
    /// Page cursor requested.
    pub cursor: u32,
    /// Replace or append.
    pub mode: FetchMode,
}

/// One page of games as returned for a cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    /// Games in service order.
    pub games: Vec<Game>,
    /// Cursor the page was fetched with.
    pub fetched_with_cursor: u32,
    /// Whether the page was shorter than a full page.
    pub is_final_page: bool,
}

impl ResultPage {
    /// Wrap `games`, flagging the page final when it holds fewer than `page_size` entries.
    pub fn new(games: Vec<Game>, cursor: u32, page_size: usize) -> Self {
        let is_final_page = games.len() < page_size;
        Self {
            games,
            fetched_with_cursor: cursor,
            is_final_page,
        }
    }
}

/// Mutable search state exclusively owned by the controller.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    /// Current criteria.
    pub criteria: SearchCriteria,
    /// Accumulated results, shared cheaply with view models.
    pub results: Arc<Vec<Game>>,
    /// Current status.
    pub status: SearchStatus,
    /// Message of the last failure for the current criteria.
    pub last_error: Option<String>,
    /// Pages of the current criteria held in `results`; 0 when they are superseded or cached.
    pub pages_loaded: u32,
    /// Whether the most recent page applied was final.
    pub last_page_final: bool,
    /// Mode of the most recent failed fetch, used by retry.
    pub failed_mode: Option<FetchMode>,
}

impl SearchSession {
    /// Whether another page may be requested for the current criteria.
    pub fn can_load_more(&self) -> bool {
        self.pages_loaded > 0
            && !self.last_page_final
            && match self.status {
                SearchStatus::Ready => true,
                SearchStatus::Error => self.failed_mode == Some(FetchMode::Append),
                _ => false,
            }
    }

    /// Immutable snapshot for renderers.
    pub fn view_model(&self) -> ViewModel {
        ViewModel {
            criteria: self.criteria.clone(),
            results: Arc::clone(&self.results),
            status: self.status,
            error: self.last_error.clone(),
            can_load_more: self.can_load_more(),
        }
    }
}

/// Read-only snapshot handed to the renderer after every update.
#[derive(Debug, Clone)]
pub struct ViewModel {
    /// Criteria currently in effect.
    pub criteria: SearchCriteria,
    /// Games to display.
    pub results: Arc<Vec<Game>>,
    /// Current status.
    pub status: SearchStatus,
    /// Inline error message, if any.
    pub error: Option<String>,
    /// Whether a "load more" control should be offered.
    pub can_load_more: bool,
}

impl ViewModel {
    /// Whether a fetch is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self.status, SearchStatus::Loading | SearchStatus::LoadingMore)
    }
}
