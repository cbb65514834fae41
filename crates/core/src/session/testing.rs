//! Test doubles for driving the controller deterministically.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::oneshot;

use crate::{
    api::{SearchApi, SearchRequest},
    error::SearchError,
    models::{Game, GameDetail},
};

type Reply = oneshot::Sender<Result<Vec<Game>, SearchError>>;

pub(crate) fn game(id: i64) -> Game {
    Game::from_values(vec![json!({
        "id": id,
        "name": format!("Game {id}"),
        "genres": ["Action"],
        "rating": 4.0
    })])
    .remove(0)
}

pub(crate) fn games(range: std::ops::Range<i64>) -> Vec<Game> {
    range.map(game).collect()
}

/// Search API whose responses are released by the test, in any order.
#[derive(Clone, Default)]
pub(crate) struct GatedApi {
    calls: Arc<Mutex<Vec<(SearchRequest, Option<Reply>)>>>,
}

impl GatedApi {
    pub(crate) fn requests(&self) -> Vec<SearchRequest> {
        self.calls
            .lock()
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub(crate) fn resolve(&self, index: usize, outcome: Result<Vec<Game>, SearchError>) {
        let reply = self
            .calls
            .lock()
            .get_mut(index)
            .and_then(|(_, reply)| reply.take())
            .expect("call should be pending");
        let _ = reply.send(outcome);
    }
}

impl SearchApi for GatedApi {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Game>, SearchError> {
        let (reply, outcome) = oneshot::channel();
        self.calls.lock().push((request.clone(), Some(reply)));
        outcome
            .await
            .unwrap_or_else(|_| Err(SearchError::network("request abandoned")))
    }

    async fn game(&self, id: i64) -> Result<GameDetail, SearchError> {
        Err(SearchError::server(404, Some(format!("Game {id} not found"))))
    }

    async fn platforms(&self) -> Result<Vec<String>, SearchError> {
        Ok(Vec::new())
    }

    async fn genres(&self) -> Result<Vec<String>, SearchError> {
        Ok(Vec::new())
    }
}

/// Let spawned tasks run until they block.
pub(crate) async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
