//! HTTP client for the Courtside API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

use reqwest::{Client, StatusCode};
use url::Url;

use crate::objects::{
    MatchEventListResponse, MatchListResponse, MatchSnapshot, RecordEventRequest,
    RecordEventResponse,
};

/// Errors produced by the SDK HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Typed HTTP client for the Courtside ingestion and read APIs.
#[derive(Debug, Clone)]
pub struct CourtsideClient {
    http: Client,
    base_url: Url,
}

impl CourtsideClient {
    /// Create a new `CourtsideClient`.
    ///
    /// * `base_url` – root URL of the Courtside server
    ///   (e.g. `http://scores.internal:8080`).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /api/v1/events` – publish a match event.
    ///
    /// A success response means the event is queued, not yet applied to
    /// the match aggregate.
    pub async fn record_event(
        &self,
        request: &RecordEventRequest,
    ) -> Result<RecordEventResponse, ClientError> {
        let url = self.base_url.join("/api/v1/events")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/matches/{match_id}` – fetch a match snapshot.
    pub async fn match_snapshot(&self, match_id: i64) -> Result<MatchSnapshot, ClientError> {
        let url = self.base_url.join(&format!("/api/v1/matches/{match_id}"))?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/matches?date=YYYY-MM-DD` – list a day's matches.
    pub async fn matches_on(&self, date: &str) -> Result<MatchListResponse, ClientError> {
        let url = self.base_url.join("/api/v1/matches")?;
        let resp = self.http.get(url).query(&[("date", date)]).send().await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/matches/{match_id}/events` – recent ledger rows for a
    /// match, newest first.
    pub async fn match_events(
        &self,
        match_id: i64,
    ) -> Result<MatchEventListResponse, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/matches/{match_id}/events"))?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
