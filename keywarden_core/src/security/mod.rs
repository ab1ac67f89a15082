//! Security module: credential encryption and secret handling
//!
//! Holds the process-wide master key, the authenticated cipher used for
//! credential blobs, and a zeroizing container for decrypted secrets.

pub mod cipher;
pub mod secret_string;

// Re-export main types
pub use cipher::{CipherError, CredentialCipher, KeyError, MasterKey, NONCE_LEN};
pub use secret_string::SecretString;
