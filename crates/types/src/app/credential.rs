// Path: crates/types/src/app/credential.rs

use crate::error::CredentialError;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Environment variable that carries the wallet private key.
pub const PRIVATE_KEY_ENV: &str = "ETH_PRIVATE_KEY";

/// The wallet private key injected into every submit-class request.
///
/// Loaded once per process. The key material is wiped on drop and is never
/// rendered by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    private_key: String,
}

impl Credential {
    /// Wraps a private key, rejecting an empty one.
    pub fn new(private_key: impl Into<String>) -> Result<Self, CredentialError> {
        let private_key = private_key.into();
        if private_key.is_empty() {
            return Err(CredentialError::Empty(PRIVATE_KEY_ENV));
        }
        Ok(Self { private_key })
    }

    /// Reads the key from [`PRIVATE_KEY_ENV`].
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the key through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(PRIVATE_KEY_ENV) {
            Some(value) => Self::new(value),
            None => Err(CredentialError::Missing(PRIVATE_KEY_ENV)),
        }
    }

    /// The raw key, for injection into request bodies.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_is_reported_by_name() {
        let err = Credential::from_lookup(|_| None).unwrap_err();
        assert_eq!(err, CredentialError::Missing(PRIVATE_KEY_ENV));
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = Credential::from_lookup(|_| Some(String::new())).unwrap_err();
        assert_eq!(err, CredentialError::Empty(PRIVATE_KEY_ENV));
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let credential = Credential::new("0xdeadbeef").unwrap();
        let rendered = format!("{:?}", credential);
        assert!(!rendered.contains("deadbeef"));
        assert!(rendered.contains("<redacted>"));
        assert_eq!(credential.private_key(), "0xdeadbeef");
    }
}
