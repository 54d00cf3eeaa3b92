// HTTP client for the ripmate download server.
//
// Wraps `reqwest::Client` with base-URL joining, status checking, and the
// server's error-body convention: non-2xx responses carry a JSON object
// with at least a `message` string field.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::settings::Settings;
use crate::transport::TransportConfig;

/// Error body shape for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Async client for the download server's REST API.
///
/// All endpoints are relative to a configured base URL (typically
/// `http://localhost:<port>` for the locally running backend).
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Used by tests to point the client at a mock server.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Settings endpoint ────────────────────────────────────────────

    /// Fetch the persisted settings record.
    pub async fn get_settings(&self) -> Result<Settings, Error> {
        let url = self.endpoint("settings")?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::parse_json(resp).await
    }

    /// Submit an edited settings record. Returns the authoritative,
    /// possibly-normalized record the server persisted.
    pub async fn post_settings(&self, settings: &Settings) -> Result<Settings, Error> {
        let url = self.endpoint("settings")?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(settings)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::parse_json(resp).await
    }

    // ── Link submission ──────────────────────────────────────────────

    /// Hand a batch of gallery links (newline-separated text) to the server
    /// for parsing and enqueueing. The response body is not consumed.
    pub async fn post_links(&self, links: &str) -> Result<(), Error> {
        let url = self.endpoint("post")?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(&json!({ "links": links }))
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::check_status(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Check the status, then deserialize the body. Non-2xx responses are
    /// mapped to `Error::Api` carrying the server's `message` when the body
    /// parses, or a generic `HTTP <status>` message when it doesn't.
    async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Self::api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Status-only variant for endpoints whose success body we ignore.
    async fn check_status(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.map_err(Error::Transport)?;
        Err(Self::api_error(status.as_u16(), &body))
    }

    fn api_error(status: u16, body: &str) -> Error {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map_or_else(|_| format!("HTTP {status}"), |b| b.message);
        Error::Api { status, message }
    }
}
