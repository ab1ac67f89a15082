//! Single-attempt upstream client
//!
//! One [`ModelClient::generate`] call is one attempt with one decrypted
//! key. Every way an attempt can go wrong is folded into a per-key
//! [`AttemptFailure`]; the dispatcher decides whether to try the next key.

use async_trait::async_trait;
use std::time::Duration;

use crate::dispatch::wire::{API_KEY_HEADER, GenerateRequest, GenerateResponse};
use crate::security::{CipherError, SecretString};

/// Outcome of one attempt against the upstream service
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    /// Usable, non-empty result text
    Success(String),
    /// Per-key failure; the dispatcher advances to the next credential
    Failed(AttemptFailure),
}

/// Why one credential attempt did not yield a usable result
///
/// These are logged with the key's position only and aggregated into the
/// final error; none of them abort the dispatch on their own.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AttemptFailure {
    /// The stored blob could not be decrypted
    #[error("stored credential could not be decrypted: {0}")]
    Decrypt(CipherError),

    /// Transport-level failure (connect, timeout, unreadable body)
    #[error("network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success HTTP status
    #[error("upstream returned status {0}")]
    Status(u16),

    /// Upstream answered 200 but embedded an error object in the body
    #[error("upstream error: {0}")]
    Api(String),

    /// Well-formed response with no candidate text
    #[error("upstream returned a valid but empty response")]
    Empty,
}

/// One attempt against the upstream generation API
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, api_key: &SecretString, request: &GenerateRequest) -> AttemptOutcome;
}

/// HTTP implementation of [`ModelClient`]
///
/// Sends the request body as JSON with the decrypted key in the
/// `x-goog-api-key` header and a bounded per-attempt timeout. The key never
/// appears in the URL, the body, or any error produced here.
pub struct HttpModelClient {
    http: reqwest::Client,
    endpoint: String,
    attempt_timeout: Duration,
}

impl HttpModelClient {
    pub fn new(endpoint: impl Into<String>, attempt_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            attempt_timeout,
        }
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn generate(&self, api_key: &SecretString, request: &GenerateRequest) -> AttemptOutcome {
        let response = match self
            .http
            .post(&self.endpoint)
            .timeout(self.attempt_timeout)
            .header(API_KEY_HEADER, api_key.expose())
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // reqwest errors mention the endpoint at most, never headers
                return AttemptOutcome::Failed(AttemptFailure::Network(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return AttemptOutcome::Failed(AttemptFailure::Status(status.as_u16()));
        }

        let body: GenerateResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                return AttemptOutcome::Failed(AttemptFailure::Network(format!(
                    "unreadable response body: {e}"
                )));
            }
        };

        if let Some(error) = body.error {
            return AttemptOutcome::Failed(AttemptFailure::Api(error.message));
        }

        match body.into_text() {
            Some(text) => AttemptOutcome::Success(text),
            None => AttemptOutcome::Failed(AttemptFailure::Empty),
        }
    }
}
