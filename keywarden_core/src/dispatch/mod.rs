//! Fallback dispatch over a tenant's stored credentials
//!
//! One dispatch takes a read-only decrypted snapshot of the tenant's
//! credentials and walks it strictly in stored order, one attempt per key.
//! The first usable response wins; any per-key failure (including a stored
//! blob that would not decrypt) advances to the next credential. Only total exhaustion or an empty
//! configuration surfaces to the caller, and the aggregate error carries
//! the last failure's description only.

pub mod client;
pub mod persona;
pub mod wire;

// Re-export main types
pub use client::{AttemptFailure, AttemptOutcome, HttpModelClient, ModelClient};
pub use wire::{API_KEY_HEADER, GenerateRequest, GenerateResponse};

use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::store::{StoreError, TenantStore};

/// Default upstream endpoint for the generation API
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

/// Default bound on a single credential attempt
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Upstream endpoint URL
    pub endpoint: String,
    /// Bound on each individual attempt; the total across N credentials
    /// is deliberately unbounded
    pub attempt_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }
}

/// User-facing dispatch failures
///
/// Per-key failures never appear here individually; they are logged with
/// the key's position and folded into `AllCredentialsFailed`.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The tenant has no credentials at all; nothing was attempted
    #[error("no API keys are configured for this server")]
    NoCredentialsConfigured,

    /// Every stored credential was attempted and none produced a result
    #[error("all {attempts} configured API keys failed; last error: {last}")]
    AllCredentialsFailed { attempts: usize, last: String },

    /// Fetching the credential list itself failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Sequential first-success-wins dispatcher
pub struct Dispatcher {
    store: Arc<TenantStore>,
    client: Arc<dyn ModelClient>,
}

impl Dispatcher {
    pub fn new(store: Arc<TenantStore>, client: Arc<dyn ModelClient>) -> Self {
        Self { store, client }
    }

    /// Convenience constructor wiring up the HTTP client from config
    pub fn with_http_client(store: Arc<TenantStore>, config: &DispatchConfig) -> Self {
        let client = HttpModelClient::new(config.endpoint.clone(), config.attempt_timeout);
        Self::new(store, Arc::new(client))
    }

    /// Resolve the system instruction for a tenant
    ///
    /// The tenant's own instruction text wins; an empty one falls back to
    /// the default persona.
    async fn system_instruction(&self, tenant_id: &str) -> Result<String, StoreError> {
        let text = self.store.instruction_text(tenant_id).await?;
        if text.is_empty() {
            Ok(persona::default_persona())
        } else {
            Ok(text)
        }
    }

    /// Run one dispatch for a tenant
    ///
    /// Attempts each stored credential in insertion order and returns the
    /// first usable response text.
    pub async fn dispatch(
        &self,
        tenant_id: &str,
        user_input: &str,
    ) -> Result<String, DispatchError> {
        let snapshot = self.store.credential_snapshot(tenant_id).await?;
        if snapshot.is_empty() {
            return Err(DispatchError::NoCredentialsConfigured);
        }
        let attempts = snapshot.len();

        let system_instruction = self.system_instruction(tenant_id).await?;
        let request = GenerateRequest::new(&system_instruction, user_input);

        let mut last_failure: Option<AttemptFailure> = None;
        for (index, entry) in snapshot.into_iter().enumerate() {
            let position = index + 1;

            // A corrupted stored entry is a per-key failure; it must not
            // block the remaining valid keys.
            let outcome = match entry {
                Ok(api_key) => self.client.generate(&api_key, &request).await,
                Err(e) => AttemptOutcome::Failed(AttemptFailure::Decrypt(e)),
            };

            match outcome {
                AttemptOutcome::Success(text) => {
                    debug!("credential #{position} produced a response");
                    return Ok(text);
                }
                AttemptOutcome::Failed(failure) => {
                    warn!("credential #{position} failed: {failure}; trying next key");
                    last_failure = Some(failure);
                }
            }
        }

        let last = last_failure
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown failure".to_string());
        Err(DispatchError::AllCredentialsFailed { attempts, last })
    }
}
