//! Zeroizing container for decrypted credential material
//!
//! Decrypted API keys only ever live inside a [`SecretString`], which zeros
//! its memory on drop and refuses to print its contents through `Debug` or
//! `Display`.

use std::fmt;
use zeroize::Zeroize;

/// A secret byte string that zeros its memory when dropped
///
/// Holds decrypted credentials between the cipher and the outbound request.
/// Comparison is constant-time, and neither `Debug` nor `Display` ever
/// reveal the contents.
#[derive(Clone)]
pub struct SecretString {
    inner: Vec<u8>,
}

impl SecretString {
    /// Create a new secret from a string
    pub fn new(s: impl Into<String>) -> Self {
        Self {
            inner: s.into().into_bytes(),
        }
    }

    /// Create a secret from raw bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { inner: bytes }
    }

    /// Get the secret as a byte slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Try to view the secret as UTF-8
    pub fn to_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.inner)
    }

    /// Expose the secret as an owned `String` (use with caution)
    ///
    /// The returned copy is NOT zeroed automatically. Only call this at the
    /// boundary where the secret actually leaves the process, e.g. when
    /// building the authentication header.
    pub fn expose(&self) -> String {
        String::from_utf8_lossy(&self.inner).into_owned()
    }

    /// Constant-time equality
    pub fn constant_time_eq(&self, other: &Self) -> bool {
        if self.inner.len() != other.inner.len() {
            return false;
        }

        let mut result = 0u8;
        for (a, b) in self.inner.iter().zip(other.inner.iter()) {
            result |= a ^ b;
        }
        result == 0
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

// Redacted Debug/Display to prevent accidental credential logging
impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.constant_time_eq(other)
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
