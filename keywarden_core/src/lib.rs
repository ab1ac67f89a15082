//! Keywarden core library
//!
//! Per-tenant encrypted credential storage and resilient fallback dispatch
//! against an upstream AI text-generation service. Each tenant (one Discord
//! guild) owns an ordered list of encrypted API keys, an activation channel
//! and a custom instruction string; the dispatcher tries each key in stored
//! order and returns the first usable response.

pub mod dispatch;
pub mod error;
pub mod security;
pub mod store;

// Re-export main types
pub use dispatch::{
    AttemptFailure, AttemptOutcome, DispatchConfig, DispatchError, Dispatcher, HttpModelClient,
    ModelClient,
};
pub use error::{Error, Result};
pub use security::{CipherError, CredentialCipher, KeyError, MasterKey, SecretString};
pub use store::{
    FileRepository, MemoryRepository, StoreError, TenantRecord, TenantRepository, TenantStore,
};
