//! HTTP client for the remote assistant backend.
//!
//! The backend is a plain request/response collaborator:
//! - `POST /chat` - answer one chat turn
//! - `GET /boards` - the backend's view of the boards (never merged locally)
//! - `POST /feedback`, `POST /escalate` - best-effort mirrors of local records

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::{ChatRequest, ChatResponse, EscalationRecord, FeedbackRecord};

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),
}

/// Base URL, optional bearer token and a shared connection pool.
#[derive(Debug, Clone)]
pub(crate) struct Backend {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl Backend {
    /// Fails when the HTTP stack cannot be set up with the requested timeout.
    pub(crate) fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    /// Build a request with optional auth header.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        handle_response(response).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }

    /// POST where the response body is irrelevant.
    pub(crate) async fn post_discard<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }
}

/// Handle response, converting HTTP errors to ClientError.
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let response = check_status(response).await?;
    Ok(response.json().await?)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
        StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        _ => Err(ClientError::Server(format!("{}: {}", status, body))),
    }
}

/// Client for the remote assistant.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    backend: Backend,
}

impl AssistantClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            backend: Backend::new(base_url, api_key, timeout)?,
        })
    }

    /// Send one chat turn.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        self.backend.post("/chat", request).await
    }

    /// Fetch the backend's board listing. The shape is opaque to the client.
    pub async fn list_boards(&self) -> Result<serde_json::Value, ClientError> {
        self.backend.get("/boards").await
    }

    pub async fn send_feedback(&self, record: &FeedbackRecord) -> Result<(), ClientError> {
        self.backend.post_discard("/feedback", record).await
    }

    pub async fn send_escalation(&self, record: &EscalationRecord) -> Result<(), ClientError> {
        self.backend.post_discard("/escalate", record).await
    }
}
