//! RPC client abstraction for Solana.
//!
//! The executor talks to the chain through [`RpcClientLike`] so tests can
//! substitute an in-process mock. The production implementation is the
//! nonblocking [`RpcClient`] from `solana-client`.

use async_trait::async_trait;
use solana_account::Account;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_response::RpcPrioritizationFee;
use solana_commitment_config::CommitmentConfig;
use solana_message::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;

/// Error from the underlying RPC transport.
#[derive(Debug, thiserror::Error)]
#[error("rpc error: {0}")]
pub struct RpcError(pub String);

/// The subset of Solana RPC operations the executor needs.
#[async_trait]
pub trait RpcClientLike: Send + Sync {
    /// Fetches an account by address.
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Account, RpcError>;

    /// Returns the latest blockhash.
    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError>;

    /// Returns recent prioritization fees for the given writable accounts.
    async fn get_recent_prioritization_fees(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<RpcPrioritizationFee>, RpcError>;

    /// Submits a signed transaction and returns its signature.
    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, RpcError>;

    /// Checks whether a transaction has reached the given commitment.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<bool, RpcError>;
}

#[async_trait]
impl<R: RpcClientLike + ?Sized> RpcClientLike for std::sync::Arc<R> {
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Account, RpcError> {
        (**self).get_account(pubkey).await
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        (**self).get_latest_blockhash().await
    }

    async fn get_recent_prioritization_fees(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<RpcPrioritizationFee>, RpcError> {
        (**self).get_recent_prioritization_fees(addresses).await
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, RpcError> {
        (**self).send_transaction(transaction).await
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<bool, RpcError> {
        (**self).confirm_transaction(signature, commitment).await
    }
}

#[async_trait]
impl RpcClientLike for RpcClient {
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Account, RpcError> {
        Self::get_account(self, pubkey)
            .await
            .map_err(|e| RpcError(e.to_string()))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        Self::get_latest_blockhash(self)
            .await
            .map_err(|e| RpcError(e.to_string()))
    }

    async fn get_recent_prioritization_fees(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<RpcPrioritizationFee>, RpcError> {
        Self::get_recent_prioritization_fees(self, addresses)
            .await
            .map_err(|e| RpcError(e.to_string()))
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, RpcError> {
        Self::send_transaction(self, transaction)
            .await
            .map_err(|e| RpcError(e.to_string()))
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<bool, RpcError> {
        self.confirm_transaction_with_commitment(signature, commitment)
            .await
            .map(|response| response.value)
            .map_err(|e| RpcError(e.to_string()))
    }
}
