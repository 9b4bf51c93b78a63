//! API client for communicating with the Legal QA REST API.
//!
//! This module provides the `ApiClient` struct for the authentication
//! endpoints and the thin workspace calls (ask, ingestion, monitoring, drift).

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{multipart, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    AskResponse, DriftRecord, MessageResponse, MetricSeries, MetricsWindow, Token, User,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Backend used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// HTTP request timeout in seconds.
/// 30s allows for slow answer generation while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Serialize)]
struct AddUrlRequest<'a> {
    url: &'a str,
}

/// API client for the Legal QA backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for the given base URL
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(builder: RequestBuilder, token: Option<&Token>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    // ===== Authentication =====

    /// `POST /token` with the OAuth2 password grant (form-encoded)
    pub async fn fetch_token(&self, username: &str, password: &str) -> Result<Token, ApiError> {
        let url = self.url("/token");
        debug!(url = %url, username = username, "Requesting token");

        let builder = self.client.post(&url).form(&[
            ("username", username),
            ("password", password),
            ("grant_type", "password"),
        ]);
        let parsed: TokenResponse = Self::send_json(builder).await?;

        let token = Token::new(parsed.access_token);
        if token.is_empty() {
            return Err(ApiError::InvalidResponse("empty access_token".to_string()));
        }
        Ok(token)
    }

    /// `POST /register`. The response body is opaque; only the status matters.
    pub async fn register_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let url = self.url("/register");
        debug!(url = %url, username = username, "Registering account");

        let response = self
            .client
            .post(&url)
            .json(&RegisterRequest {
                username,
                email,
                password,
            })
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    /// `GET /users/me` for the given bearer token
    pub async fn fetch_current_user(&self, token: &Token) -> Result<User, ApiError> {
        let builder = self.client.get(self.url("/users/me")).bearer_auth(token.as_str());
        Self::send_json(builder).await
    }

    // ===== Workspace =====

    /// Ask a question. Public; the bearer is attached when a session exists.
    pub async fn ask(&self, question: &str, token: Option<&Token>) -> Result<AskResponse> {
        let builder = self
            .client
            .post(self.url("/ask"))
            .json(&AskRequest { question });
        Self::send_json(Self::authorized(builder, token))
            .await
            .context("Failed to get answer")
    }

    /// Queue a web page or PDF URL for ingestion
    pub async fn add_url(&self, token: &Token, url: &str) -> Result<MessageResponse> {
        let builder = self
            .client
            .post(self.url("/add_url"))
            .bearer_auth(token.as_str())
            .json(&AddUrlRequest { url });
        Self::send_json(builder).await.context("Failed to add URL")
    }

    /// Upload local documents as one multipart request, one `files` part each
    pub async fn upload_documents<P: AsRef<Path>>(
        &self,
        token: &Token,
        paths: &[P],
    ) -> Result<MessageResponse> {
        let mut form = multipart::Form::new();
        for path in paths {
            let path = path.as_ref();
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            debug!(file = %file_name, bytes = bytes.len(), "Adding upload part");
            form = form.part("files", multipart::Part::bytes(bytes).file_name(file_name));
        }

        let builder = self
            .client
            .post(self.url("/upload_documents"))
            .bearer_auth(token.as_str())
            .multipart(form);
        Self::send_json(builder)
            .await
            .context("Failed to upload documents")
    }

    /// Daily or weekly usage series
    pub async fn fetch_metrics(&self, token: &Token, window: MetricsWindow) -> Result<MetricSeries> {
        let builder = self
            .client
            .get(self.url(window.path()))
            .bearer_auth(token.as_str());
        Self::send_json(builder)
            .await
            .with_context(|| format!("Failed to fetch {} metrics", window.title().to_lowercase()))
    }

    /// Free-form overall metrics object
    pub async fn fetch_metrics_summary(&self, token: &Token) -> Result<serde_json::Value> {
        let builder = self
            .client
            .get(self.url("/monitoring/metrics"))
            .bearer_auth(token.as_str());
        Self::send_json(builder)
            .await
            .context("Failed to fetch metrics")
    }

    /// Production/shadow comparisons, optionally bounded by unix-second timestamps
    pub async fn fetch_drift(
        &self,
        token: &Token,
        from_timestamp: Option<i64>,
        to_timestamp: Option<i64>,
    ) -> Result<Vec<DriftRecord>> {
        let builder = self
            .client
            .get(self.url("/drift_explorer_with_context"))
            .bearer_auth(token.as_str())
            .query(&Self::drift_query(from_timestamp, to_timestamp));
        Self::send_json(builder)
            .await
            .context("Failed to fetch drift data")
    }

    fn drift_query(from_timestamp: Option<i64>, to_timestamp: Option<i64>) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(from) = from_timestamp {
            params.push(("from_timestamp", from.to_string()));
        }
        if let Some(to) = to_timestamp {
            params.push(("to_timestamp", to.to_string()));
        }
        params
    }
}
