//! Wire format types for payment challenges and proofs.
//!
//! A 402 response carries a [`PaymentChallenge`] either as a JSON body or
//! base64-encoded in the `Payment-Required` header. The retried request
//! presents its [`PaymentProof`] as the transaction signature in the
//! `X-Payment-Tx` header. The memo string inside a challenge is the nonce
//! that binds a payment to exactly one request: the client writes it into
//! the payment transaction, and the server accepts the proof only for the
//! challenge that issued the memo.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use std::fmt;

#[cfg(feature = "telemetry")]
use tracing::trace;

use crate::amount::{self, MoneyAmount};
use crate::chain::ChainId;
use crate::error::ChallengeError;

/// Response header carrying a base64-encoded JSON challenge on a 402.
pub const PAYMENT_REQUIRED_HEADER: &str = "Payment-Required";

/// Request header carrying the payment transaction signature on the retry.
pub const X_PAYMENT_TX_HEADER: &str = "X-Payment-Tx";

/// Response header carrying the server-assigned request identifier.
pub const X_REQUEST_ID_HEADER: &str = "X-Request-Id";

/// A server's demand for payment, parsed from a 402 response.
///
/// Constructed from exactly one response and consumed by at most one
/// payment attempt; challenges are never reused across calls.
///
/// # JSON Format
///
/// ```json
/// {
///   "amount": "0.01",
///   "asset": "USDC",
///   "recipient": "7aD4sFaiytMLpMUyVcMu6AeQrrTyYY3jNFB27PHifGnU",
///   "network": "solana",
///   "memo": "nodo:req_3f6a1c",
///   "requestId": "req_3f6a1c"
/// }
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentChallenge {
    /// Amount demanded, as a decimal string in the asset's display unit.
    #[serde_as(as = "DisplayFromStr")]
    pub amount: Decimal,

    /// Asset symbol (e.g. `"USDC"`) or chain-specific asset address.
    pub asset: String,

    /// Recipient address on the payment network.
    pub recipient: String,

    /// Network identifier: a well-known name or a CAIP-2 chain id.
    #[serde(default = "default_network")]
    pub network: String,

    /// Server-issued nonce binding the payment to this request.
    pub memo: String,

    /// Optional server-assigned request identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

fn default_network() -> String {
    "solana".to_owned()
}

impl PaymentChallenge {
    /// Parses and validates a challenge from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ChallengeError::Json`] for malformed JSON or missing
    /// fields, and the [`Self::validate`] errors for unusable values.
    pub fn parse(bytes: &[u8]) -> Result<Self, ChallengeError> {
        let challenge: Self = serde_json::from_slice(bytes)?;
        challenge.validate()?;
        #[cfg(feature = "telemetry")]
        trace!(
            amount = %challenge.amount,
            asset = %challenge.asset,
            network = %challenge.network,
            "Parsed payment challenge"
        );
        Ok(challenge)
    }

    /// Validates field contents beyond JSON well-formedness.
    ///
    /// # Errors
    ///
    /// Returns [`ChallengeError::EmptyField`] if the recipient, asset, or
    /// memo is empty, and [`ChallengeError::InvalidAmount`] if the amount
    /// is not strictly positive.
    pub fn validate(&self) -> Result<(), ChallengeError> {
        for (field, value) in [
            ("recipient", &self.recipient),
            ("asset", &self.asset),
            ("memo", &self.memo),
        ] {
            if value.trim().is_empty() {
                return Err(ChallengeError::EmptyField { field });
            }
        }
        if self.amount <= Decimal::ZERO {
            return Err(ChallengeError::InvalidAmount(
                amount::AmountError::Invalid(self.amount.to_string()),
            ));
        }
        Ok(())
    }

    /// Resolves the challenge's network field to a [`ChainId`].
    ///
    /// Accepts either a CAIP-2 identifier or a well-known network name.
    ///
    /// # Errors
    ///
    /// Returns [`ChallengeError::UnknownNetwork`] if the field is neither.
    pub fn chain_id(&self) -> Result<ChainId, ChallengeError> {
        if self.network.contains(':') {
            return self
                .network
                .parse()
                .map_err(|_| ChallengeError::UnknownNetwork {
                    network: self.network.clone(),
                });
        }
        ChainId::from_network_name(&self.network).ok_or_else(|| ChallengeError::UnknownNetwork {
            network: self.network.clone(),
        })
    }

    /// Returns the demanded amount as a money string source (`"0.01 USDC"`).
    #[must_use]
    pub fn money(&self) -> MoneyAmount {
        MoneyAmount::new(self.amount, self.asset.clone())
    }
}

/// Signed evidence that a [`PaymentChallenge`] was satisfied.
///
/// On Solana the transaction id is the transaction's signature; the memo
/// records which challenge the payment was bound to. A proof is attached to
/// exactly one retried request and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    /// Transaction signature (base58).
    pub txid: String,

    /// The challenge memo this payment was bound to.
    pub memo: String,
}

impl PaymentProof {
    /// Creates a proof from a transaction id and the memo it satisfied.
    pub fn new(txid: impl Into<String>, memo: impl Into<String>) -> Self {
        Self {
            txid: txid.into(),
            memo: memo.into(),
        }
    }
}

impl fmt::Display for PaymentProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.txid)
    }
}
