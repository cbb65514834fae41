//! Search session state and the controller that drives it.

mod controller;
mod models;

pub use controller::{ControllerEvent, ControllerSettings, SearchController};
pub use models::{FetchMode, FetchTag, ResultPage, SearchSession, SearchStatus, ViewModel};

#[cfg(test)]
mod testing;
