//! Authenticated encryption of individual credentials
//!
//! Credentials are encrypted with AES-256-GCM under a single process-wide
//! master key. Each blob is `hex(nonce || ciphertext)` with a fresh random
//! nonce per encryption, so encrypting the same plaintext twice yields
//! different blobs. The GCM tag makes tampering with stored blobs
//! detectable before a corrupted key ever reaches an outbound request.

use crate::security::SecretString;
use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Environment variable holding the 64-hex-character master key
pub const ENCRYPTION_KEY_VAR: &str = "KEYWARDEN_ENCRYPTION_KEY";

/// AES-GCM nonce length in bytes; prefixed to every ciphertext
pub const NONCE_LEN: usize = 12;

/// Errors from loading the process-wide master key
///
/// All of these are fatal startup conditions; no store or dispatcher may be
/// constructed without a valid key.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The key environment variable is not set
    #[error("{ENCRYPTION_KEY_VAR} environment variable not set")]
    Missing,

    /// The key has the wrong length (must be 64 hex characters for 32 bytes)
    #[error("encryption key must be a 64-character hex string, got {got} characters")]
    InvalidLength { got: usize },

    /// The key is not valid hex
    #[error("encryption key is not valid hex")]
    InvalidHex,
}

/// Errors from encrypting or decrypting a credential blob
///
/// `MalformedInput` and `AuthenticationFailed` stay distinct so operators
/// can tell a truncated or mis-encoded blob apart from a wrong key or
/// tampered ciphertext. Neither carries key material or plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// Blob is not valid hex or shorter than the nonce prefix
    #[error("ciphertext blob is malformed")]
    MalformedInput,

    /// GCM tag verification failed: wrong key or tampered data
    #[error("ciphertext failed authentication")]
    AuthenticationFailed,

    /// Encryption itself failed (plaintext exceeds the AEAD limit)
    #[error("encryption failed")]
    Encrypt,
}

/// The process-wide 256-bit symmetric key
///
/// Loaded once at startup, zeroed on drop, never logged and never exposed
/// to callers. Construction validates length and hex encoding up front, so
/// a cipher can only ever exist with a usable key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; 32]);

impl MasterKey {
    /// Parse a key from a 64-character hex string
    pub fn from_hex(hex_key: &str) -> Result<Self, KeyError> {
        // AES-256 requires a 32-byte key, which is 64 hex characters.
        if hex_key.len() != 64 {
            return Err(KeyError::InvalidLength { got: hex_key.len() });
        }

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_key, &mut bytes).map_err(|_| KeyError::InvalidHex)?;
        Ok(Self(bytes))
    }

    /// Load the key from the `KEYWARDEN_ENCRYPTION_KEY` environment variable
    pub fn from_env() -> Result<Self, KeyError> {
        let hex_key = std::env::var(ENCRYPTION_KEY_VAR).map_err(|_| KeyError::Missing)?;
        Self::from_hex(hex_key.trim())
    }

    fn as_cipher_key(&self) -> &Key<Aes256Gcm> {
        Key::<Aes256Gcm>::from_slice(&self.0)
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MasterKey(***)")
    }
}

/// Authenticated cipher for credential blobs
#[derive(Clone)]
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl CredentialCipher {
    /// Create a cipher from a validated master key
    pub fn new(key: &MasterKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.as_cipher_key()),
        }
    }

    /// Encrypt a plaintext credential into a hex blob
    ///
    /// A fresh random nonce is drawn for every call and prepended to the
    /// ciphertext, so identical plaintexts never produce identical blobs.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Encrypt)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(hex::encode(blob))
    }

    /// Decrypt a hex blob back into the plaintext credential
    pub fn decrypt(&self, blob: &str) -> Result<SecretString, CipherError> {
        let raw = hex::decode(blob).map_err(|_| CipherError::MalformedInput)?;

        if raw.len() < NONCE_LEN {
            return Err(CipherError::MalformedInput);
        }

        // The nonce was prepended to the ciphertext, so split it off.
        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::AuthenticationFailed)?;

        Ok(SecretString::from_bytes(plaintext))
    }
}
