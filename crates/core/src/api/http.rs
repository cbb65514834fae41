use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::AppConfig,
    error::SearchError,
    models::{Game, GameDetail},
};

use super::{SearchApi, SearchRequest};

/// `reqwest`-backed client for the game search service.
#[derive(Debug, Clone)]
pub struct HttpSearchApi {
    client: Client,
    base_url: String,
}

impl HttpSearchApi {
    /// Client for the service at `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SearchError::from)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client configured from the application settings.
    pub fn from_config(config: &AppConfig) -> Result<Self, SearchError> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Value, SearchError> {
        let url = self.endpoint(path);
        debug!(%url, ?query, "GET");
        let response = self.client.get(&url).query(query).send().await?;
        let response = ensure_success(response).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|err| SearchError::malformed(format!("invalid JSON from {path}: {err}")))
    }

    async fn get_name_list(&self, path: &str, key: &str) -> Result<Vec<String>, SearchError> {
        let body = self.get_json(path, &[]).await?;
        let names = body
            .get(key)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|name| !name.trim().is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(names)
    }
}

impl SearchApi for HttpSearchApi {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Game>, SearchError> {
        let body = self.get_json("search", &request.query_pairs()).await?;
        let Value::Array(entries) = body else {
            return Err(SearchError::malformed("expected a list of games"));
        };
        let received = entries.len();
        let games = Game::from_values(entries);
        if games.len() != received {
            warn!(
                received,
                decoded = games.len(),
                "skipped malformed entries in search response"
            );
        }
        Ok(games)
    }

    async fn game(&self, id: i64) -> Result<GameDetail, SearchError> {
        let body = self.get_json(&format!("game/{id}"), &[]).await?;
        decode(body, "game")
    }

    async fn platforms(&self) -> Result<Vec<String>, SearchError> {
        self.get_name_list("platforms/", "platforms").await
    }

    async fn genres(&self) -> Result<Vec<String>, SearchError> {
        self.get_name_list("genres/", "genres").await
    }
}

async fn ensure_success(response: Response) -> Result<Response, SearchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // FastAPI reports failures as `{"detail": ...}`, other services use `message`.
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("message")
                .or_else(|| body.get("detail"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });
    Err(SearchError::server(status.as_u16(), message))
}

fn decode<T: DeserializeOwned>(body: Value, what: &str) -> Result<T, SearchError> {
    if !body.is_object() {
        return Err(SearchError::malformed(format!("expected a {what} object")));
    }
    serde_json::from_value(body).map_err(|err| SearchError::malformed(format!("{what}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::SortKey;
    use httpmock::prelude::*;
    use serde_json::json;

    fn api_for(server: &MockServer) -> HttpSearchApi {
        HttpSearchApi::new(server.base_url(), Duration::from_secs(5))
            .expect("client should build")
    }

    fn halo_request() -> SearchRequest {
        SearchRequest {
            q: "halo".to_string(),
            page: 2,
            platform: Some("PC".to_string()),
            genre: None,
            sort_by: SortKey::Rating,
            min_rating: 3.0,
        }
    }

    #[tokio::test]
    async fn search_sends_wire_parameters() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .query_param("q", "halo")
                    .query_param("page", "2")
                    .query_param("platform", "PC")
                    .query_param("sort_by", "rating")
                    .query_param("min_rating", "3");
                then.status(200).json_body(json!([
                    {"id": 1, "name": "Halo: Combat Evolved", "genres": ["Shooter"]},
                    {"id": 2, "name": "Halo 2", "genres": null},
                    42
                ]));
            })
            .await;

        let games = api_for(&server)
            .search(&halo_request())
            .await
            .expect("search should succeed");
        mock.assert_async().await;
        assert_eq!(games.len(), 2);
        assert_eq!(games[1].name, "Halo 2");
        assert!(games[1].genres.is_empty());
    }

    #[tokio::test]
    async fn server_errors_carry_the_service_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(500)
                    .json_body(json!({"detail": "Database connection failed"}));
            })
            .await;

        let err = api_for(&server)
            .search(&halo_request())
            .await
            .expect_err("search should fail");
        assert_eq!(
            err,
            SearchError::NetworkOrServer {
                status: Some(500),
                message: "Database connection failed".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn non_list_bodies_are_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(json!({"results": []}));
            })
            .await;

        let err = api_for(&server)
            .search(&halo_request())
            .await
            .expect_err("object body should be rejected");
        assert!(matches!(err, SearchError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_network_error() {
        let api = HttpSearchApi::new("http://127.0.0.1:9", Duration::from_secs(2))
            .expect("client should build");
        let err = api
            .search(&halo_request())
            .await
            .expect_err("nothing listens on the discard port");
        assert!(matches!(
            err,
            SearchError::NetworkOrServer { status: None, .. }
        ));
    }

    #[tokio::test]
    async fn loads_detail_and_facets() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/game/3498");
                then.status(200).json_body(json!({
                    "game_id": 3498,
                    "name": "Grand Theft Auto V",
                    "stores": [{"store": {"slug": "steam"}, "url": "https://steam.example/271590"}]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/platforms/");
                then.status(200)
                    .json_body(json!({"platforms": ["PC", "Xbox One", null]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/genres/");
                then.status(200).json_body(json!({"unexpected": true}));
            })
            .await;

        let api = api_for(&server);
        let detail = api.game(3498).await.expect("detail should load");
        assert_eq!(detail.summary.id, 3498);
        assert_eq!(detail.store_url("steam"), Some("https://steam.example/271590"));

        assert_eq!(
            api.platforms().await.expect("platforms should load"),
            vec!["PC", "Xbox One"]
        );
        assert!(api.genres().await.expect("genres should load").is_empty());
    }

    #[tokio::test]
    async fn missing_game_reports_not_found_detail() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/game/1");
                then.status(404).json_body(json!({"detail": "Game not found"}));
            })
            .await;

        let err = api_for(&server).game(1).await.expect_err("should be 404");
        assert_eq!(err.to_string(), "Game not found");
    }
}
