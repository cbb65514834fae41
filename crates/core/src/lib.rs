#![warn(clippy::all, missing_docs)]

//! Core search logic for the game search terminal client.
//!
//! This crate owns the search session: filter criteria and their shareable
//! query-string form, debounced and tagged fetches against the remote
//! search API, paginated result accumulation, and the single-slot cache of
//! the most recent first page. Renderers consume the read-only view model.

pub mod api;
pub mod cache;
pub mod config;
pub mod criteria;
pub mod error;
pub mod location;
pub mod models;
pub mod session;

pub use api::{HttpSearchApi, SearchApi, SearchRequest};
pub use cache::{FileResultCache, MemoryResultCache, ResultCache};
pub use config::AppConfig;
pub use criteria::{FilterChange, MinRating, SearchCriteria, SortKey};
pub use error::SearchError;
pub use location::{SharedLocation, UrlSink};
pub use models::{Game, GameDetail};
pub use session::{
    ControllerEvent, ControllerSettings, ResultPage, SearchController, SearchSession,
    SearchStatus, ViewModel,
};
