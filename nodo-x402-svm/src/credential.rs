//! Signing credential handling.
//!
//! A [`Credential`] owns the Solana keypair used to sign payments. It is
//! held exclusively by the executor; the `Debug` output and error messages
//! only ever show the public key. There is no way to serialize a
//! credential back out of this type.

use std::path::Path;

use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signer::Signer;

/// Errors produced while loading a signing credential.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The keypair file could not be read.
    #[error("failed to read keypair file `{path}`: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The keypair file is not a JSON array of bytes.
    #[error("keypair file is not a JSON byte array: {0}")]
    Json(#[from] serde_json::Error),

    /// The bytes do not form a valid ed25519 keypair.
    #[error("invalid keypair bytes: {0}")]
    InvalidKey(String),
}

/// The signing capability for Solana payments.
pub struct Credential {
    keypair: Keypair,
}

impl Credential {
    /// Wraps an existing keypair.
    #[must_use]
    pub const fn from_keypair(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Builds a credential from raw 64-byte keypair material.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidKey`] if the bytes do not form a
    /// valid ed25519 keypair.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CredentialError> {
        let keypair =
            Keypair::try_from(bytes).map_err(|e| CredentialError::InvalidKey(e.to_string()))?;
        Ok(Self { keypair })
    }

    /// Loads a credential from a Solana CLI keypair file.
    ///
    /// The file format is the standard `id.json`: a JSON array of 64 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the file cannot be read or does not
    /// contain a valid keypair.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CredentialError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let bytes: Vec<u8> = serde_json::from_str(&raw)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the public key of this credential.
    #[must_use]
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Scoped access to the signing keypair for transaction signing.
    pub(crate) const fn signer(&self) -> &Keypair {
        &self.keypair
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("pubkey", &self.pubkey())
            .field("secret", &"<redacted>")
            .finish()
    }
}
