//! In-memory tenant repository
//!
//! Backs tests and single-process deployments. A single async mutex around
//! the map makes every operation atomic with respect to concurrent callers.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::store::StoreError;
use crate::store::repository::{TenantRecord, TenantRepository};

/// Tenant repository held entirely in process memory
#[derive(Default)]
pub struct MemoryRepository {
    tenants: Mutex<HashMap<String, TenantRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantRepository for MemoryRepository {
    async fn fetch(&self, tenant_id: &str) -> Result<Option<TenantRecord>, StoreError> {
        let tenants = self.tenants.lock().await;
        Ok(tenants.get(tenant_id).cloned())
    }

    async fn push_credential(&self, tenant_id: &str, blob: &str) -> Result<(), StoreError> {
        let mut tenants = self.tenants.lock().await;
        let record = tenants
            .entry(tenant_id.to_string())
            .or_insert_with(|| TenantRecord::new(tenant_id));

        if !record.credentials.iter().any(|b| b == blob) {
            record.credentials.push(blob.to_string());
        }
        Ok(())
    }

    async fn pull_credentials(
        &self,
        tenant_id: &str,
        blobs: &[String],
    ) -> Result<usize, StoreError> {
        let mut tenants = self.tenants.lock().await;
        let Some(record) = tenants.get_mut(tenant_id) else {
            return Ok(0);
        };

        let before = record.credentials.len();
        record.credentials.retain(|b| !blobs.contains(b));
        Ok(before - record.credentials.len())
    }

    async fn set_credentials(&self, tenant_id: &str, blobs: Vec<String>) -> Result<(), StoreError> {
        let mut tenants = self.tenants.lock().await;
        tenants
            .entry(tenant_id.to_string())
            .or_insert_with(|| TenantRecord::new(tenant_id))
            .credentials = blobs;
        Ok(())
    }

    async fn set_activation_channel(
        &self,
        tenant_id: &str,
        channel_id: &str,
    ) -> Result<(), StoreError> {
        let mut tenants = self.tenants.lock().await;
        tenants
            .entry(tenant_id.to_string())
            .or_insert_with(|| TenantRecord::new(tenant_id))
            .activation_channel = channel_id.to_string();
        Ok(())
    }

    async fn set_instruction_text(&self, tenant_id: &str, text: &str) -> Result<(), StoreError> {
        let mut tenants = self.tenants.lock().await;
        tenants
            .entry(tenant_id.to_string())
            .or_insert_with(|| TenantRecord::new(tenant_id))
            .instruction_text = text.to_string();
        Ok(())
    }
}
