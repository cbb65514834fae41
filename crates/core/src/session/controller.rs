use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    api::{SearchApi, SearchRequest},
    cache::ResultCache,
    criteria::{FilterChange, SearchCriteria},
    error::SearchError,
    location::UrlSink,
    models::Game,
};

use super::models::{FetchMode, FetchTag, ResultPage, SearchSession, SearchStatus, ViewModel};

/// Timing and paging parameters of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Quiet period before a query edit triggers a search.
    pub debounce: Duration,
    /// Length of a full page; shorter pages are final.
    pub page_size: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            page_size: 20,
        }
    }
}

/// Completion notices from tasks spawned by the controller.
#[derive(Debug)]
pub enum ControllerEvent {
    /// A debounce timer ran out.
    DebounceElapsed {
        /// Ticket of the timer that fired.
        ticket: u64,
    },
    /// A search call resolved.
    FetchCompleted {
        /// Tag assigned when the fetch was issued.
        tag: FetchTag,
        /// Result of the call.
        outcome: Result<Vec<Game>, SearchError>,
    },
}

struct PendingDebounce {
    ticket: u64,
    handle: JoinHandle<()>,
}

/// Single source of truth for search intent and results.
///
/// Fetches and the debounce timer run as spawned tokio tasks that report
/// back through [`ControllerEvent`]s; the owner feeds those to
/// [`SearchController::handle_event`] (or calls [`SearchController::step`]),
/// so the session is only ever mutated from the owning task. Must be used
/// from within a tokio runtime.
pub struct SearchController<A: SearchApi> {
    api: Arc<A>,
    cache: Box<dyn ResultCache>,
    location: Box<dyn UrlSink>,
    settings: ControllerSettings,
    session: SearchSession,
    generation: u64,
    next_request: u64,
    authoritative: Option<FetchTag>,
    debounce: Option<PendingDebounce>,
    next_ticket: u64,
    showing_cached: bool,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    events_rx: mpsc::UnboundedReceiver<ControllerEvent>,
}

impl<A: SearchApi> SearchController<A> {
    /// Create a controller, seeding the results from the cache when it holds a page.
    pub fn new(
        api: Arc<A>,
        cache: impl ResultCache + 'static,
        location: impl UrlSink + 'static,
        settings: ControllerSettings,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut session = SearchSession::default();
        let mut showing_cached = false;
        match cache.load() {
            Ok(Some(games)) if !games.is_empty() => {
                info!(count = games.len(), "showing cached results");
                session.results = Arc::new(games);
                session.status = SearchStatus::Ready;
                showing_cached = true;
            }
            Ok(_) => {}
            Err(err) => warn!(?err, "failed to load cached results"),
        }

        Self {
            api,
            cache: Box::new(cache),
            location: Box::new(location),
            settings,
            session,
            generation: 0,
            next_request: 0,
            authoritative: None,
            debounce: None,
            next_ticket: 0,
            showing_cached,
            events_tx,
            events_rx,
        }
    }

    /// Shared handle to the search API.
    pub fn api(&self) -> Arc<A> {
        Arc::clone(&self.api)
    }

    /// Current criteria.
    pub fn criteria(&self) -> &SearchCriteria {
        &self.session.criteria
    }

    /// Canonical share query string for the current criteria.
    pub fn share_query(&self) -> String {
        self.session.criteria.to_query_string()
    }

    /// Snapshot for the renderer.
    pub fn view_model(&self) -> ViewModel {
        self.session.view_model()
    }

    /// Whether a debounce timer or fetch is outstanding.
    pub fn has_pending_work(&self) -> bool {
        self.debounce.is_some() || self.authoritative.is_some()
    }

    /// Initialise the criteria from a share query string and search right away when it names a query.
    pub fn restore_from_url(&mut self, query: &str) {
        let criteria = SearchCriteria::from_query_string(query);
        info!(share = %criteria.to_query_string(), "restoring search");
        self.cancel_debounce();
        self.session.criteria = criteria;
        let cached = self
            .showing_cached
            .then(|| Arc::clone(&self.session.results));
        self.invalidate();
        if let Some(cached) = cached {
            // The cached snapshot stays presentable until the restored search lands.
            self.session.results = cached;
            self.session.status = SearchStatus::Ready;
            self.showing_cached = true;
        }
        self.publish_location();

        if self.session.criteria.has_query() {
            self.issue_fetch(FetchMode::Fresh);
            if self.showing_cached {
                self.session.status = SearchStatus::Ready;
            }
        }
    }

    /// Update the free-text query. Non-empty text schedules a debounced search;
    /// empty text cancels it and clears results and cache without calling the API.
    pub fn set_query_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.session.criteria.query_text {
            if !self.session.criteria.has_query() && !self.session.results.is_empty() {
                self.clear_search();
            }
            return;
        }

        self.session.criteria.query_text = text;
        self.session.criteria.page_cursor = 1;
        self.invalidate();
        self.publish_location();

        if self.session.criteria.has_query() {
            self.schedule_debounce();
            self.session.status = SearchStatus::Loading;
        } else {
            self.clear_search();
        }
    }

    /// Adjust a filter dimension and search immediately when a query is present.
    pub fn set_filter(&mut self, change: FilterChange) {
        if !self.session.criteria.apply(change) {
            return;
        }

        self.invalidate();
        self.publish_location();

        if self.session.criteria.has_query() {
            self.cancel_debounce();
            self.issue_fetch(FetchMode::Fresh);
        }
    }

    /// Fetch and append the next page. Returns `false` without side effects
    /// when the last page was final or a fetch is already in flight.
    pub fn load_more(&mut self) -> bool {
        if self.authoritative.is_some() || !self.session.can_load_more() {
            debug!(status = ?self.session.status, "load more unavailable");
            return false;
        }
        self.issue_fetch(FetchMode::Append);
        true
    }

    /// Re-issue the last failed fetch for the current criteria without moving the cursor.
    pub fn retry(&mut self) -> bool {
        if self.session.status != SearchStatus::Error || !self.session.criteria.has_query() {
            return false;
        }
        let mode = match self.session.failed_mode {
            Some(FetchMode::Append) if self.session.pages_loaded > 0 => FetchMode::Append,
            _ => FetchMode::Fresh,
        };
        self.cancel_debounce();
        self.issue_fetch(mode);
        true
    }

    /// Wait for the next completion notice from a spawned task.
    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        self.events_rx.recv().await
    }

    /// Apply a completion notice to the session.
    pub fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::DebounceElapsed { ticket } => self.debounce_elapsed(ticket),
            ControllerEvent::FetchCompleted { tag, outcome } => self.complete_fetch(tag, outcome),
        }
    }

    /// Wait for and apply one completion notice.
    pub async fn step(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Drop everything accumulated for the previous criteria.
    fn invalidate(&mut self) {
        self.generation += 1;
        if let Some(superseded) = self.authoritative.take() {
            debug!(request = superseded.request, "superseding in-flight search");
        }
        self.showing_cached = false;
        self.session.results = Arc::new(Vec::new());
        self.session.pages_loaded = 0;
        self.session.last_page_final = false;
        self.session.failed_mode = None;
        self.session.last_error = None;
        self.session.status = SearchStatus::Idle;
    }

    fn clear_search(&mut self) {
        self.cancel_debounce();
        self.authoritative = None;
        self.showing_cached = false;
        self.session.results = Arc::new(Vec::new());
        self.session.status = SearchStatus::Idle;
        self.session.last_error = None;
        if let Err(err) = self.cache.clear() {
            warn!(?err, "failed to clear cached results");
        }
    }

    fn publish_location(&mut self) {
        let query = self.session.criteria.to_query_string();
        debug!(%query, "publishing share link");
        self.location.replace(&query);
    }

    fn schedule_debounce(&mut self) {
        self.cancel_debounce();
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let delay = self.settings.debounce;
        let events = self.events_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(ControllerEvent::DebounceElapsed { ticket });
        });
        debug!(ticket, "debounce scheduled");
        self.debounce = Some(PendingDebounce { ticket, handle });
    }

    fn cancel_debounce(&mut self) {
        if let Some(pending) = self.debounce.take() {
            pending.handle.abort();
            debug!(ticket = pending.ticket, "debounce cancelled");
        }
    }

    fn debounce_elapsed(&mut self, ticket: u64) {
        // A timer can fire after cancellation; only the live ticket counts.
        let live = self
            .debounce
            .as_ref()
            .is_some_and(|pending| pending.ticket == ticket);
        if !live {
            debug!(ticket, "ignoring cancelled debounce");
            return;
        }
        self.debounce = None;
        if self.session.criteria.has_query() {
            self.issue_fetch(FetchMode::Fresh);
        }
    }

    fn issue_fetch(&mut self, mode: FetchMode) {
        let cursor = match mode {
            FetchMode::Fresh => 1,
            FetchMode::Append => self.session.pages_loaded + 1,
        };
        self.session.criteria.page_cursor = cursor;
        self.next_request += 1;
        let tag = FetchTag {
            generation: self.generation,
            request: self.next_request,
            cursor,
            mode,
        };
        self.authoritative = Some(tag);
        self.session.status = match mode {
            FetchMode::Fresh => SearchStatus::Loading,
            FetchMode::Append => SearchStatus::LoadingMore,
        };
        self.session.last_error = None;

        let request = SearchRequest::from_criteria(&self.session.criteria);
        info!(q = %request.q, page = cursor, request = tag.request, "issuing search");
        let api = Arc::clone(&self.api);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = api.search(&request).await;
            let _ = events.send(ControllerEvent::FetchCompleted { tag, outcome });
        });
    }

    fn complete_fetch(&mut self, tag: FetchTag, outcome: Result<Vec<Game>, SearchError>) {
        if tag.generation != self.generation || self.authoritative != Some(tag) {
            debug!(
                request = tag.request,
                generation = tag.generation,
                current = self.generation,
                "discarding stale search response"
            );
            return;
        }
        self.authoritative = None;

        match outcome {
            Ok(games) => {
                let page = ResultPage::new(games, tag.cursor, self.settings.page_size);
                self.apply_page(tag.mode, page);
            }
            Err(err) => {
                warn!(request = tag.request, page = tag.cursor, %err, "search failed");
                self.session.status = SearchStatus::Error;
                self.session.last_error = Some(err.to_string());
                self.session.failed_mode = Some(tag.mode);
            }
        }
    }

    fn apply_page(&mut self, mode: FetchMode, page: ResultPage) {
        info!(
            page = page.fetched_with_cursor,
            count = page.games.len(),
            final_page = page.is_final_page,
            "applying search results"
        );
        match mode {
            FetchMode::Fresh => {
                if let Err(err) = self.cache.store(&page.games) {
                    warn!(?err, "failed to persist results cache");
                }
                self.session.results = Arc::new(page.games);
            }
            FetchMode::Append => Arc::make_mut(&mut self.session.results).extend(page.games),
        }
        self.showing_cached = false;
        self.session.pages_loaded = page.fetched_with_cursor;
        self.session.last_page_final = page.is_final_page;
        self.session.status = SearchStatus::Ready;
        self.session.last_error = None;
        self.session.failed_mode = None;
    }
}

impl<A: SearchApi> Drop for SearchController<A> {
    fn drop(&mut self) {
        self.cancel_debounce();
    }
}
