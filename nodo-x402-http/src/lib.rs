#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP client layer for the Nodo 402 pay-and-retry protocol.
//!
//! This crate provides [`PayingClient`], an HTTP client that automatically
//! handles `402 Payment Required` responses. When a request receives a 402,
//! the client parses the payment challenge, pays it through a pluggable
//! [`PaymentExecutor`](nodo_x402::PaymentExecutor), and retries the request
//! exactly once with the payment proof attached.
//!
//! ## The retry contract
//!
//! Per call the client performs at most one payment submission and at most
//! one retried send. A second 402 on the retried request is a protocol
//! violation and fails with [`ClientError::PaymentRejected`] instead of
//! looping, so a single call can never pay twice. Failures that happen
//! after a payment was made carry the [`PaymentProof`](nodo_x402::PaymentProof)
//! (see [`ClientError::payment_proof`]) so callers can tell "money was not
//! spent" apart from "money may have been spent".
//!
//! ## Policies and hooks
//!
//! A spend cap ([`PayingClient::with_max_amount`]) and before/after payment
//! hooks ([`hooks::ClientHooks`]) gate the payment step; see [`hooks`].

mod client;
mod error;
pub mod hooks;
mod types;

pub use client::PayingClient;
pub use error::ClientError;
pub use types::{RequestSpec, ResponseMeta, ResponseResult};
