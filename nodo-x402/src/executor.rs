//! The payment-executor capability.
//!
//! An executor is the one collaborator able to move money: it takes a
//! validated [`PaymentChallenge`], submits a payment on the named network,
//! and returns the [`PaymentProof`]. The HTTP client guarantees by
//! construction that `pay` is called at most once per challenge, so
//! implementations do not need to deduplicate.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ExecutorError;
use crate::proto::{PaymentChallenge, PaymentProof};

/// Capability for submitting a payment that satisfies a challenge.
///
/// Implementations hold the signing credential; it is never exposed to the
/// transport layer and must not appear in logs or error messages.
#[async_trait]
pub trait PaymentExecutor: Send + Sync {
    /// Submits a payment satisfying `challenge` and returns the proof.
    ///
    /// Called at most once per challenge. This is the operation expected to
    /// suspend on a payment-network round-trip.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] if the payment cannot be built, signed,
    /// submitted, or confirmed. Implementations must not retry a submission
    /// themselves; a duplicate submission could double-charge.
    async fn pay(&self, challenge: &PaymentChallenge) -> Result<PaymentProof, ExecutorError>;
}

#[async_trait]
impl<E: PaymentExecutor + ?Sized> PaymentExecutor for Arc<E> {
    async fn pay(&self, challenge: &PaymentChallenge) -> Result<PaymentProof, ExecutorError> {
        (**self).pay(challenge).await
    }
}
