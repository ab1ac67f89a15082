//! JSON-file tenant repository
//!
//! Stores the full map of tenant records as one JSON document, written via
//! a temporary file and an atomic rename. Credential blobs are already
//! encrypted before they reach this layer, so the file itself needs no
//! additional protection beyond filesystem permissions. An async mutex
//! serializes the load-modify-save cycle so each operation stays atomic.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::store::StoreError;
use crate::store::repository::{TenantRecord, TenantRepository};

/// Tenant repository persisted to a single JSON file
pub struct FileRepository {
    file_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRepository {
    /// Open a repository at the given path, creating parent directories
    pub async fn open(file_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let file_path = file_path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        Ok(Self {
            file_path,
            write_lock: Mutex::new(()),
        })
    }

    async fn load(&self) -> Result<HashMap<String, TenantRecord>, StoreError> {
        if !self.file_path.exists() {
            return Ok(HashMap::new());
        }

        let data = fs::read(&self.file_path).await?;
        serde_json::from_slice(&data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn save(&self, tenants: &HashMap<String, TenantRecord>) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(tenants)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        // Write to a temporary file first, then rename into place.
        let temp_path = self.file_path.with_extension("tmp");
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await?;

        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.file_path).await?;
        Ok(())
    }

    /// Load, apply one mutation under the write lock, and save
    async fn update_record<F>(&self, tenant_id: &str, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut TenantRecord),
    {
        let _guard = self.write_lock.lock().await;
        let mut tenants = self.load().await?;
        let record = tenants
            .entry(tenant_id.to_string())
            .or_insert_with(|| TenantRecord::new(tenant_id));
        apply(record);
        self.save(&tenants).await
    }
}

#[async_trait]
impl TenantRepository for FileRepository {
    async fn fetch(&self, tenant_id: &str) -> Result<Option<TenantRecord>, StoreError> {
        let tenants = self.load().await?;
        Ok(tenants.get(tenant_id).cloned())
    }

    async fn push_credential(&self, tenant_id: &str, blob: &str) -> Result<(), StoreError> {
        self.update_record(tenant_id, |record| {
            if !record.credentials.iter().any(|b| b == blob) {
                record.credentials.push(blob.to_string());
            }
        })
        .await
    }

    async fn pull_credentials(
        &self,
        tenant_id: &str,
        blobs: &[String],
    ) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut tenants = self.load().await?;
        let Some(record) = tenants.get_mut(tenant_id) else {
            return Ok(0);
        };

        let before = record.credentials.len();
        record.credentials.retain(|b| !blobs.contains(b));
        let removed = before - record.credentials.len();

        if removed > 0 {
            self.save(&tenants).await?;
        }
        Ok(removed)
    }

    async fn set_credentials(&self, tenant_id: &str, blobs: Vec<String>) -> Result<(), StoreError> {
        self.update_record(tenant_id, |record| record.credentials = blobs)
            .await
    }

    async fn set_activation_channel(
        &self,
        tenant_id: &str,
        channel_id: &str,
    ) -> Result<(), StoreError> {
        self.update_record(tenant_id, |record| {
            record.activation_channel = channel_id.to_string();
        })
        .await
    }

    async fn set_instruction_text(&self, tenant_id: &str, text: &str) -> Result<(), StoreError> {
        self.update_record(tenant_id, |record| {
            record.instruction_text = text.to_string();
        })
        .await
    }
}
