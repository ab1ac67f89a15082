//! Per-tenant credential and configuration store
//!
//! The [`TenantStore`] owns the encryption step: plaintext credentials go
//! in, encrypted blobs come out, and plaintext is never persisted. Reads on
//! unknown tenants return empty defaults rather than errors, so callers
//! never have to distinguish "tenant unknown" from "nothing configured".

pub mod file;
pub mod memory;
pub mod repository;

// Re-export main types
pub use file::FileRepository;
pub use memory::MemoryRepository;
pub use repository::{TenantRecord, TenantRepository};

use log::warn;
use std::sync::Arc;
use thiserror::Error;

use crate::security::{CipherError, CredentialCipher, SecretString};

/// Errors from tenant store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// No stored credential matched the removal target
    #[error("no matching API key found for this server")]
    NotFound,

    /// Underlying storage I/O failed
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted document could not be encoded or decoded
    #[error("storage serialization error: {0}")]
    Serialization(String),

    /// Credential encryption failed
    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Store for per-tenant credentials, activation channel and instructions
///
/// All operations are keyed by tenant identifier and upsert the tenant's
/// record on first write; there is no explicit registration step.
pub struct TenantStore {
    repository: Arc<dyn TenantRepository>,
    cipher: CredentialCipher,
}

impl TenantStore {
    pub fn new(repository: Arc<dyn TenantRepository>, cipher: CredentialCipher) -> Self {
        Self { repository, cipher }
    }

    /// Encrypt and store a credential for a tenant
    ///
    /// Identical encrypted blobs are deduplicated by the repository; since
    /// every encryption draws a fresh nonce, adding the same plaintext
    /// twice stores two distinct blobs.
    pub async fn add_credential(&self, tenant_id: &str, plaintext: &str) -> Result<(), StoreError> {
        let blob = self.cipher.encrypt(plaintext)?;
        self.repository.push_credential(tenant_id, &blob).await
    }

    /// List a tenant's encrypted credential blobs in insertion order
    ///
    /// An unknown tenant yields an empty list, not an error.
    pub async fn list_credentials(&self, tenant_id: &str) -> Result<Vec<String>, StoreError> {
        let record = self.repository.fetch(tenant_id).await?;
        Ok(record.map(|r| r.credentials).unwrap_or_default())
    }

    /// Decrypt each stored credential, in insertion order
    ///
    /// Returns one entry per stored blob so a single corrupted entry shows
    /// up as that entry's failure instead of hiding the remaining valid
    /// keys. The caller receives a read-only copy; nothing is mutated.
    pub async fn credential_snapshot(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<Result<SecretString, CipherError>>, StoreError> {
        let blobs = self.list_credentials(tenant_id).await?;
        Ok(blobs.iter().map(|blob| self.cipher.decrypt(blob)).collect())
    }

    /// Remove every stored credential whose plaintext equals the given one
    ///
    /// Re-encrypting the plaintext can never reproduce a stored blob, so
    /// removal decrypts each candidate and compares in constant time.
    /// Entries that fail to decrypt can never match and are skipped.
    pub async fn remove_credential(
        &self,
        tenant_id: &str,
        plaintext: &str,
    ) -> Result<(), StoreError> {
        let blobs = self.list_credentials(tenant_id).await?;
        let target = SecretString::new(plaintext);

        let mut matched = Vec::new();
        for (position, blob) in blobs.iter().enumerate() {
            match self.cipher.decrypt(blob) {
                Ok(secret) if secret.constant_time_eq(&target) => matched.push(blob.clone()),
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        "skipping undecryptable credential #{} during removal: {e}",
                        position + 1
                    );
                }
            }
        }

        let removed = self.repository.pull_credentials(tenant_id, &matched).await?;
        if removed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Remove all credentials for a tenant; succeeds even if there were none
    pub async fn clear_credentials(&self, tenant_id: &str) -> Result<(), StoreError> {
        self.repository.set_credentials(tenant_id, Vec::new()).await
    }

    /// Set the tenant's activation channel, creating the record if absent
    pub async fn set_activation_channel(
        &self,
        tenant_id: &str,
        channel_id: &str,
    ) -> Result<(), StoreError> {
        self.repository
            .set_activation_channel(tenant_id, channel_id)
            .await
    }

    /// Get the tenant's activation channel; empty string when never set
    pub async fn activation_channel(&self, tenant_id: &str) -> Result<String, StoreError> {
        let record = self.repository.fetch(tenant_id).await?;
        Ok(record.map(|r| r.activation_channel).unwrap_or_default())
    }

    /// Set the tenant's custom system instruction
    pub async fn set_instruction_text(
        &self,
        tenant_id: &str,
        text: &str,
    ) -> Result<(), StoreError> {
        self.repository.set_instruction_text(tenant_id, text).await
    }

    /// Get the tenant's custom system instruction; empty string when never set
    pub async fn instruction_text(&self, tenant_id: &str) -> Result<String, StoreError> {
        let record = self.repository.fetch(tenant_id).await?;
        Ok(record.map(|r| r.instruction_text).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::MasterKey;

    fn test_store() -> TenantStore {
        let key = MasterKey::from_hex(&"42".repeat(32)).unwrap();
        TenantStore::new(
            Arc::new(MemoryRepository::new()),
            CredentialCipher::new(&key),
        )
    }

    #[tokio::test]
    async fn test_list_unknown_tenant_is_empty() {
        let store = test_store();
        assert!(store.list_credentials("g1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_stores_ciphertext_only() {
        let store = test_store();
        store.add_credential("g1", "secretABC").await.unwrap();

        let blobs = store.list_credentials("g1").await.unwrap();
        assert_eq!(blobs.len(), 1);
        assert!(!blobs[0].contains("secretABC"));
        assert_eq!(
            store.cipher.decrypt(&blobs[0]).unwrap().to_str().unwrap(),
            "secretABC"
        );
    }

    #[tokio::test]
    async fn test_same_plaintext_added_twice_stores_two_blobs() {
        // Encryption is non-deterministic, so duplicate plaintexts are not
        // detected; only identical encrypted values dedupe.
        let store = test_store();
        store.add_credential("g1", "secretABC").await.unwrap();
        store.add_credential("g1", "secretABC").await.unwrap();

        assert_eq!(store.list_credentials("g1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_preserves_order_and_flags_corrupt_entries() {
        let store = test_store();
        store.add_credential("g1", "first").await.unwrap();
        store
            .repository
            .push_credential("g1", "deadbeef")
            .await
            .unwrap();
        store.add_credential("g1", "third").await.unwrap();

        let snapshot = store.credential_snapshot("g1").await.unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].as_ref().unwrap().to_str().unwrap(), "first");
        assert!(snapshot[1].is_err());
        assert_eq!(snapshot[2].as_ref().unwrap().to_str().unwrap(), "third");
    }

    #[tokio::test]
    async fn test_snapshot_of_unknown_tenant_is_empty() {
        let store = test_store();
        assert!(store.credential_snapshot("g1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_by_plaintext() {
        let store = test_store();
        store.add_credential("g1", "secretABC").await.unwrap();
        store.add_credential("g1", "other").await.unwrap();

        store.remove_credential("g1", "secretABC").await.unwrap();

        let blobs = store.list_credentials("g1").await.unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(
            store.cipher.decrypt(&blobs[0]).unwrap().to_str().unwrap(),
            "other"
        );

        // Removing the same plaintext again finds nothing
        let result = store.remove_credential("g1", "secretABC").await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_remove_drops_every_duplicate_plaintext() {
        let store = test_store();
        store.add_credential("g1", "secretABC").await.unwrap();
        store.add_credential("g1", "secretABC").await.unwrap();

        store.remove_credential("g1", "secretABC").await.unwrap();
        assert!(store.list_credentials("g1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_succeeds_without_credentials() {
        let store = test_store();
        store.clear_credentials("g1").await.unwrap();
        assert!(store.list_credentials("g1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_all() {
        let store = test_store();
        store.add_credential("g1", "a").await.unwrap();
        store.add_credential("g1", "b").await.unwrap();
        store.clear_credentials("g1").await.unwrap();
        assert!(store.list_credentials("g1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_activation_channel_round_trip() {
        let store = test_store();
        store.set_activation_channel("G1", "C1").await.unwrap();
        assert_eq!(store.activation_channel("G1").await.unwrap(), "C1");

        // Never-configured tenant reads as empty, not as an error
        assert_eq!(store.activation_channel("G2").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_instruction_text_round_trip() {
        let store = test_store();
        store
            .set_instruction_text("g1", "answer in haiku")
            .await
            .unwrap();
        assert_eq!(
            store.instruction_text("g1").await.unwrap(),
            "answer in haiku"
        );
        assert_eq!(store.instruction_text("g2").await.unwrap(), "");
    }
}
