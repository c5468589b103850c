//! Error taxonomy shared across the pay-and-retry SDK.
//!
//! Two families of failure exist before and after money moves:
//! [`ChallengeError`] covers everything that happens while a 402 response
//! is being parsed and validated (no payment has been attempted), and
//! [`ExecutorError`] covers the payment leg itself. The HTTP client crate
//! wraps both into its caller-facing error type.

use crate::amount::AmountError;

/// Errors produced while parsing or validating a 402 payment challenge.
///
/// None of these imply any funds were spent.
#[derive(Debug, thiserror::Error)]
pub enum ChallengeError {
    /// The challenge is not valid JSON or is missing required fields.
    #[error("challenge is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The challenge could not be decoded from its header encoding.
    #[error("challenge header is not decodable: {0}")]
    Encoding(String),

    /// A required challenge field is present but empty.
    #[error("challenge field `{field}` is empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The challenge amount is not a payable value.
    #[error("challenge amount is invalid: {0}")]
    InvalidAmount(#[from] AmountError),

    /// The challenge names a network this client does not know.
    #[error("unknown network `{network}`")]
    UnknownNetwork {
        /// The network identifier as it appeared in the challenge.
        network: String,
    },
}

/// Errors produced by a payment executor.
///
/// A failed execution is never retried by the client: a second attempt
/// could double-charge. [`ExecutorError::transaction`] reports whether a
/// transaction was already submitted when the failure occurred.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The executor cannot pay on the challenge's network.
    #[error("unsupported network `{0}`")]
    UnsupportedNetwork(String),

    /// The executor cannot pay in the challenge's asset.
    #[error("unsupported asset `{asset}` on network `{network}`")]
    UnsupportedAsset {
        /// The asset symbol or address from the challenge.
        asset: String,
        /// The network the challenge named.
        network: String,
    },

    /// The challenge itself was unusable (e.g. unconvertible amount).
    #[error(transparent)]
    Challenge(#[from] ChallengeError),

    /// Building the payment transaction failed before signing.
    #[error("failed to build payment transaction: {0}")]
    Build(String),

    /// Signing the payment transaction failed.
    #[error("failed to sign payment transaction: {0}")]
    Signing(String),

    /// The payment network rejected the submission.
    #[error("payment submission failed: {0}")]
    Submission(String),

    /// The transaction was submitted but confirmation did not complete.
    ///
    /// Funds may have moved; the transaction id is retained so callers can
    /// check the payment rail directly.
    #[error("confirmation of payment transaction {txid} failed: {reason}")]
    Confirmation {
        /// Signature of the submitted transaction.
        txid: String,
        /// Why confirmation did not complete.
        reason: String,
    },
}

impl ExecutorError {
    /// Returns the submitted transaction id if the failure occurred after
    /// submission, i.e. when funds may already have moved.
    #[must_use]
    pub fn transaction(&self) -> Option<&str> {
        match self {
            Self::Confirmation { txid, .. } => Some(txid),
            _ => None,
        }
    }
}

impl From<AmountError> for ExecutorError {
    fn from(err: AmountError) -> Self {
        Self::Challenge(ChallengeError::InvalidAmount(err))
    }
}
