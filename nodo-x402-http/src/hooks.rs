//! Lifecycle hooks for the payment pipeline.
//!
//! Hooks let applications observe or veto the payment step without taking
//! over the retry loop:
//!
//! - **Before hooks** run after a challenge is parsed and may abort the
//!   payment (first abort wins); the call then fails with
//!   [`PaymentAborted`](crate::ClientError::PaymentAborted) and no money
//!   moves.
//! - **After hooks** run once a payment has been made, before the retry is
//!   sent. Their results do not affect the call.
//!
//! There is deliberately no failure-recovery hook: substituting a payment
//! result from a hook would break the at-most-one-payment-per-call
//! guarantee.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use nodo_x402::proto::{PaymentChallenge, PaymentProof};

/// Context passed to before-payment hooks.
#[derive(Debug, Clone)]
pub struct PaymentContext {
    /// The parsed challenge the client is about to pay.
    pub challenge: PaymentChallenge,
}

/// Context passed to after-payment hooks.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// The challenge that was paid.
    pub challenge: PaymentChallenge,
    /// The proof returned by the executor.
    pub proof: PaymentProof,
}

/// Returned by a before-payment hook to veto the payment.
#[derive(Debug, Clone)]
pub struct AbortPayment {
    /// Human-readable reason, surfaced to the caller.
    pub reason: String,
}

impl AbortPayment {
    /// Creates an abort with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type alias for a before-payment hook callback.
pub type BeforePaymentHookFn =
    dyn Fn(PaymentContext) -> BoxFut<'static, Option<AbortPayment>> + Send + Sync;

/// Type alias for an after-payment hook callback.
pub type AfterPaymentHookFn = dyn Fn(PaymentOutcome) -> BoxFut<'static, ()> + Send + Sync;

/// Collection of lifecycle hooks for the payment pipeline.
///
/// Hooks of the same kind run in registration order.
#[derive(Clone, Default)]
pub struct ClientHooks {
    pub(crate) before_payment: Vec<Arc<BeforePaymentHookFn>>,
    pub(crate) after_payment: Vec<Arc<AfterPaymentHookFn>>,
}

impl ClientHooks {
    /// Creates an empty hook collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a before-payment hook. Return `Some(AbortPayment)` to veto.
    #[must_use]
    pub fn on_before_payment<F>(mut self, hook: F) -> Self
    where
        F: Fn(PaymentContext) -> BoxFut<'static, Option<AbortPayment>> + Send + Sync + 'static,
    {
        self.before_payment.push(Arc::new(hook));
        self
    }

    /// Registers an after-payment hook.
    #[must_use]
    pub fn on_after_payment<F>(mut self, hook: F) -> Self
    where
        F: Fn(PaymentOutcome) -> BoxFut<'static, ()> + Send + Sync + 'static,
    {
        self.after_payment.push(Arc::new(hook));
        self
    }
}

impl std::fmt::Debug for ClientHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHooks")
            .field("before_payment", &self.before_payment.len())
            .field("after_payment", &self.after_payment.len())
            .finish()
    }
}
