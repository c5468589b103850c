//! Error types for the pay-and-retry client.

use nodo_x402::error::{ChallengeError, ExecutorError};
use nodo_x402::proto::PaymentProof;

/// Errors surfaced by [`PayingClient::request`](crate::PayingClient::request).
///
/// The taxonomy deliberately separates failures where no money was spent
/// (challenge parsing, policy aborts) from failures where a payment may
/// already have been submitted. Use [`ClientError::payment_proof`] and
/// [`ClientError::funds_at_risk`] to tell the two apart.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request endpoint could not be joined to the base URL.
    #[error("invalid endpoint `{endpoint}`: {source}")]
    Endpoint {
        /// The offending endpoint.
        endpoint: String,
        /// The underlying URL parse error.
        #[source]
        source: url::ParseError,
    },

    /// The server's 402 response could not be parsed into a challenge.
    ///
    /// No payment was attempted.
    #[error("malformed payment challenge: {0}")]
    MalformedChallenge(#[source] ChallengeError),

    /// A policy or hook declined the payment before it was attempted.
    ///
    /// No payment was attempted.
    #[error("payment aborted: {reason}")]
    PaymentAborted {
        /// Why the payment was declined.
        reason: String,
    },

    /// The payment executor failed.
    ///
    /// Not retried: a second attempt could double-charge. Whether funds may
    /// have moved is reported by the inner error's
    /// [`transaction`](ExecutorError::transaction).
    #[error("payment execution failed: {0}")]
    PaymentFailed(#[source] ExecutorError),

    /// The retried request was answered with another 402.
    ///
    /// A payment was made; this indicates a server/client protocol
    /// mismatch, and the client will not pay again.
    #[error("server demanded payment again after proof {proof} was presented")]
    PaymentRejected {
        /// The proof the server refused to honor.
        proof: PaymentProof,
    },

    /// The server answered with a non-success, non-402 status.
    #[error("request failed with status {status}")]
    RequestFailed {
        /// HTTP status code of the failing response.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
        /// Present when the failure happened on the retried (paid) attempt.
        proof: Option<PaymentProof>,
    },

    /// A connection-level transport failure.
    #[error("transport error: {source}")]
    Transport {
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
        /// Present when the failure happened after a payment was made.
        proof: Option<PaymentProof>,
    },

    /// The success response body was not valid JSON.
    #[error("failed to decode response body: {source}")]
    Decode {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Present when the response belonged to the retried (paid) attempt.
        proof: Option<PaymentProof>,
    },
}

impl ClientError {
    /// Returns the payment proof if this failure occurred after a payment
    /// was successfully made.
    ///
    /// `Some` means funds were spent even though the call failed; callers
    /// should surface the proof rather than silently dropping it.
    #[must_use]
    pub fn payment_proof(&self) -> Option<&PaymentProof> {
        match self {
            Self::PaymentRejected { proof } => Some(proof),
            Self::RequestFailed { proof, .. }
            | Self::Transport { proof, .. }
            | Self::Decode { proof, .. } => proof.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` if funds may have been spent despite the failure.
    ///
    /// Covers both failures after a completed payment and executor failures
    /// where a transaction had already been submitted.
    #[must_use]
    pub fn funds_at_risk(&self) -> bool {
        if self.payment_proof().is_some() {
            return true;
        }
        matches!(self, Self::PaymentFailed(err) if err.transaction().is_some())
    }
}
