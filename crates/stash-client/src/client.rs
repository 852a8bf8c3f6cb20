//! GraphQL-over-HTTP client for a Stash server.
//!
//! Requests are POSTed as JSON to the configured endpoint with an optional
//! `ApiKey` header. Every call is bounded by the client timeout.

use std::time::Duration;

use serde_json::{json, Map, Value};
use stash_metrics::{LibraryStats, Scene, StashSource};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::queries::{LIBRARY_STATS_QUERY, SCENE_PLAY_HISTORY_QUERY};

/// Default GraphQL endpoint.
pub const DEFAULT_GRAPHQL_URL: &str = "http://stash:9999/graphql";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the API key.
const API_KEY_HEADER: &str = "ApiKey";

/// Client for the Stash GraphQL API.
#[derive(Clone)]
pub struct StashClient {
    url: String,
    api_key: Option<String>,
    timeout: Duration,
    http: reqwest::Client,
}

impl std::fmt::Debug for StashClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StashClient")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl StashClient {
    /// Creates a client for the given endpoint.
    ///
    /// A trailing `/` on the URL is dropped. An empty API key counts as none.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Setup {
                message: e.to_string(),
            })?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
            timeout,
            http,
        })
    }

    /// The GraphQL endpoint.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether requests carry an API key.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Executes a GraphQL query and returns its `data` object.
    ///
    /// # Errors
    ///
    /// Fails on connection errors and timeouts, non-200 responses, bodies that
    /// are not JSON, a non-empty `errors` list, or a missing `data` field.
    pub async fn run_query(&self, query: &str, variables: Option<Value>) -> Result<Value> {
        self.execute("graphql query", query, variables).await
    }

    async fn execute(&self, operation: &str, query: &str, variables: Option<Value>) -> Result<Value> {
        let mut payload = json!({ "query": query });
        if let Some(variables) = variables.filter(|v| !is_empty_value(v)) {
            payload["variables"] = variables;
        }

        let mut request = self.http.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        debug!(url = %self.url, operation, "sending stash graphql request");
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(operation, &e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(operation, &e))?;
        let mut body: Map<String, Value> =
            serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidBody {
                message: e.to_string(),
            })?;

        if let Some(messages) = body.get("errors").and_then(graphql_errors) {
            return Err(ClientError::GraphQl { messages });
        }

        body.remove("data").ok_or(ClientError::MissingData)
    }

    fn transport_error(&self, operation: &str, err: &reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::timeout(operation, self.timeout.as_secs())
        } else {
            ClientError::request(&self.url, err.to_string())
        }
    }

    /// Fetches library-wide totals.
    ///
    /// A `null` `stats` object reads as all zeros.
    ///
    /// # Errors
    ///
    /// Fails as [`run_query`](Self::run_query) does, or when `stats` is absent.
    pub async fn fetch_library_stats(&self) -> Result<LibraryStats> {
        let data = self.execute("LibraryStats", LIBRARY_STATS_QUERY, None).await?;
        match take_field(data, "stats")? {
            Value::Null => Ok(LibraryStats::default()),
            stats => serde_json::from_value(stats).map_err(|e| ClientError::InvalidBody {
                message: format!("stats: {e}"),
            }),
        }
    }

    /// Fetches every scene.
    ///
    /// `null` at `findScenes` or `scenes` reads as an empty library.
    ///
    /// # Errors
    ///
    /// Fails as [`run_query`](Self::run_query) does, or when `findScenes` is absent.
    pub async fn fetch_scenes(&self) -> Result<Vec<Scene>> {
        let data = self
            .execute("ScenePlayHistory", SCENE_PLAY_HISTORY_QUERY, None)
            .await?;
        let scenes = match take_field(data, "findScenes")? {
            Value::Object(mut find) => find.remove("scenes").unwrap_or(Value::Null),
            _ => Value::Null,
        };
        let items = match scenes {
            Value::Null => return Ok(Vec::new()),
            Value::Array(items) => items,
            other => {
                return Err(ClientError::InvalidBody {
                    message: format!("findScenes.scenes: expected a list, got {other}"),
                });
            }
        };

        let total = items.len();
        let scenes: Vec<Scene> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(scene) => Some(scene),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable scene");
                    None
                }
            })
            .collect();
        debug!(total, decoded = scenes.len(), "decoded scenes");
        Ok(scenes)
    }
}

impl StashSource for StashClient {
    async fn library_stats(&self) -> stash_metrics::Result<LibraryStats> {
        Ok(self.fetch_library_stats().await?)
    }

    async fn scenes(&self) -> stash_metrics::Result<Vec<Scene>> {
        Ok(self.fetch_scenes().await?)
    }
}

/// Removes a top-level field from `data`, failing when it is absent.
fn take_field(data: Value, field: &str) -> Result<Value> {
    match data {
        Value::Object(mut map) => map
            .remove(field)
            .ok_or_else(|| ClientError::missing_field(field)),
        _ => Err(ClientError::missing_field(field)),
    }
}

/// Extracts messages from a non-empty GraphQL `errors` value.
fn graphql_errors(errors: &Value) -> Option<Vec<String>> {
    if is_empty_value(errors) {
        return None;
    }
    let messages = match errors {
        Value::Array(items) => items
            .iter()
            .map(|item| match item.get("message").and_then(Value::as_str) {
                Some(message) => message.to_string(),
                None => item.to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    };
    Some(messages)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Number(_) | Value::Bool(true) => false,
    }
}
