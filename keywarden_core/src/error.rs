//! Error types for the keywarden core library
//!
//! Each subsystem defines its own error enum next to its module; this module
//! provides the library-wide aggregate used by callers that cross subsystem
//! boundaries.

use thiserror::Error;

pub use crate::dispatch::DispatchError;
pub use crate::security::{CipherError, KeyError};
pub use crate::store::StoreError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the keywarden core library
///
/// Errors are categorized by the subsystem that produced them:
/// - Key errors: startup-time validation of the process-wide secret
/// - Cipher errors: decryption of individual credential blobs
/// - Store errors: tenant record persistence
/// - Dispatch errors: the fallback loop's user-facing failures
#[derive(Error, Debug)]
pub enum Error {
    /// Process-wide secret was missing or invalid at startup
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Credential encryption or decryption failed
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// Tenant record persistence failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Fallback dispatch failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
