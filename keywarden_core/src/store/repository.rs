//! Tenant record model and repository trait
//!
//! One persisted document per tenant identifier. Every mutating operation
//! is a single atomic upsert against that document; there is never an
//! existence check followed by a separate write.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Persisted configuration for one tenant (one Discord guild)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantRecord {
    /// Externally supplied unique tenant identifier
    pub tenant_id: String,

    /// Free-form server metadata
    #[serde(default)]
    pub server_data: String,

    /// Ordered list of encrypted credential blobs, insertion order.
    /// Never contains plaintext.
    #[serde(default)]
    pub credentials: Vec<String>,

    /// Activated channel identifier; empty means not activated
    #[serde(default)]
    pub activation_channel: String,

    /// Tenant-supplied system instruction; empty means use the default
    #[serde(default)]
    pub instruction_text: String,
}

impl TenantRecord {
    /// Create an empty record for a tenant
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            server_data: String::new(),
            credentials: Vec::new(),
            activation_channel: String::new(),
            instruction_text: String::new(),
        }
    }
}

/// Storage backend for tenant records
///
/// Mirrors an atomic per-document upsert API: each method is one
/// indivisible operation from the point of view of concurrent callers on
/// the same tenant. Operations on different tenants are independent.
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Fetch a tenant's record, `None` if it was never written
    async fn fetch(&self, tenant_id: &str) -> Result<Option<TenantRecord>, StoreError>;

    /// Append a credential blob unless an identical blob is already stored,
    /// creating the record if absent
    async fn push_credential(&self, tenant_id: &str, blob: &str) -> Result<(), StoreError>;

    /// Remove the given exact blobs, returning how many entries were removed.
    /// An absent tenant removes zero; no record is created.
    async fn pull_credentials(&self, tenant_id: &str, blobs: &[String])
    -> Result<usize, StoreError>;

    /// Replace the credential list wholesale, creating the record if absent
    async fn set_credentials(&self, tenant_id: &str, blobs: Vec<String>) -> Result<(), StoreError>;

    /// Set the activation channel, creating the record if absent
    async fn set_activation_channel(
        &self,
        tenant_id: &str,
        channel_id: &str,
    ) -> Result<(), StoreError>;

    /// Set the instruction text, creating the record if absent
    async fn set_instruction_text(&self, tenant_id: &str, text: &str) -> Result<(), StoreError>;
}
