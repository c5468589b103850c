//! Solana payment execution.
//!
//! [`SolanaExecutor`] satisfies a payment challenge with an SPL token
//! transfer. The challenge memo is written into the transaction as a memo
//! instruction, binding the payment to the one request that issued it;
//! the transaction signature becomes the proof presented on the retry.
//!
//! Transaction shape: compute-unit price (priority fee from recent fees),
//! memo, `transfer_checked` from the payer's associated token account to
//! the recipient's. SPL Token and Token-2022 mints are both supported.

use async_trait::async_trait;
use solana_commitment_config::CommitmentConfig;
use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_message::v0::Message as MessageV0;
use solana_message::VersionedMessage;
use solana_pubkey::{Pubkey, pubkey};
use solana_signature::Signature;
use solana_transaction::Instruction;
use solana_transaction::versioned::VersionedTransaction;
use spl_token::solana_program::instruction::AccountMeta;
use spl_token::solana_program::program_pack::Pack;
use std::time::Duration;

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument};

use nodo_x402::amount;
use nodo_x402::chain::ChainId;
use nodo_x402::error::ExecutorError;
use nodo_x402::executor::PaymentExecutor;
use nodo_x402::proto::{PaymentChallenge, PaymentProof};
use solana_client::nonblocking::rpc_client::RpcClient;

use crate::credential::Credential;
use crate::networks::usdc_deployment;
use crate::rpc::RpcClientLike;

/// Memo program public key.
pub const MEMO_PROGRAM_PUBKEY: Pubkey = pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

/// Associated Token Account program public key.
pub const ATA_PROGRAM_PUBKEY: Pubkey = pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

const CONFIRM_ATTEMPTS: usize = 30;
const CONFIRM_INTERVAL: Duration = Duration::from_millis(500);

/// Mint information for SPL tokens.
#[derive(Debug, Clone, Copy)]
pub enum Mint {
    /// Standard SPL Token mint.
    Token {
        /// Number of decimal places.
        decimals: u8,
    },
    /// SPL Token-2022 mint.
    Token2022 {
        /// Number of decimal places.
        decimals: u8,
    },
}

impl Mint {
    /// Returns the owning token program ID for this mint.
    #[must_use]
    pub fn token_program(&self) -> Pubkey {
        match self {
            Self::Token { .. } => spl_token::id(),
            Self::Token2022 { .. } => spl_token_2022::id(),
        }
    }

    /// Returns the mint's decimal places.
    #[must_use]
    pub const fn decimals(&self) -> u8 {
        match self {
            Self::Token { decimals } | Self::Token2022 { decimals } => *decimals,
        }
    }
}

/// Fetch mint information from the chain.
///
/// # Errors
///
/// Returns [`ExecutorError`] if the mint account cannot be fetched or is
/// not owned by a known token program.
pub async fn fetch_mint<R: RpcClientLike>(
    mint_address: &Pubkey,
    rpc: &R,
) -> Result<Mint, ExecutorError> {
    let account = rpc
        .get_account(mint_address)
        .await
        .map_err(|e| ExecutorError::Build(format!("failed to fetch mint {mint_address}: {e}")))?;
    if account.owner == spl_token::id() {
        let mint = spl_token::state::Mint::unpack(&account.data).map_err(|e| {
            ExecutorError::Build(format!("failed to unpack mint {mint_address}: {e}"))
        })?;
        Ok(Mint::Token {
            decimals: mint.decimals,
        })
    } else if account.owner == spl_token_2022::id() {
        let mint = spl_token_2022::state::Mint::unpack(&account.data).map_err(|e| {
            ExecutorError::Build(format!("failed to unpack mint {mint_address}: {e}"))
        })?;
        Ok(Mint::Token2022 {
            decimals: mint.decimals,
        })
    } else {
        Err(ExecutorError::Build(format!(
            "mint {mint_address} has unknown owner {}",
            account.owner
        )))
    }
}

/// Builds a memo instruction carrying the challenge memo, signed by the payer.
#[must_use]
pub fn memo_instruction(payer: &Pubkey, memo: &str) -> Instruction {
    Instruction {
        program_id: MEMO_PROGRAM_PUBKEY,
        accounts: vec![AccountMeta::new_readonly(*payer, true)],
        data: memo.as_bytes().to_vec(),
    }
}

/// Derives the associated token account for an owner, token program, and mint.
#[must_use]
pub fn associated_token_address(owner: &Pubkey, token_program: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ATA_PROGRAM_PUBKEY,
    )
    .0
}

/// Builds the instruction sequence for a memo-bound token transfer:
/// compute-unit price, memo, `transfer_checked`.
///
/// # Errors
///
/// Returns [`ExecutorError::Build`] if the transfer instruction cannot be
/// constructed.
pub fn build_payment_instructions(
    payer: &Pubkey,
    recipient: &Pubkey,
    mint_address: &Pubkey,
    mint: Mint,
    base_units: u64,
    memo: &str,
    priority_micro_lamports: u64,
) -> Result<Vec<Instruction>, ExecutorError> {
    let token_program = mint.token_program();
    let source_ata = associated_token_address(payer, &token_program, mint_address);
    let destination_ata = associated_token_address(recipient, &token_program, mint_address);

    let transfer = match mint {
        Mint::Token { decimals } => spl_token::instruction::transfer_checked(
            &token_program,
            &source_ata,
            mint_address,
            &destination_ata,
            payer,
            &[],
            base_units,
            decimals,
        )
        .map_err(|e| ExecutorError::Build(e.to_string()))?,
        Mint::Token2022 { decimals } => spl_token_2022::instruction::transfer_checked(
            &token_program,
            &source_ata,
            mint_address,
            &destination_ata,
            payer,
            &[],
            base_units,
            decimals,
        )
        .map_err(|e| ExecutorError::Build(e.to_string()))?,
    };

    Ok(vec![
        ComputeBudgetInstruction::set_compute_unit_price(priority_micro_lamports),
        memo_instruction(payer, memo),
        transfer,
    ])
}

/// Returns the priority fee in micro-lamports: the smallest recently paid
/// nonzero fee, or 1 when no data is available.
async fn priority_fee_micro_lamports<R: RpcClientLike>(
    rpc: &R,
    writable: &[Pubkey],
) -> Result<u64, ExecutorError> {
    let recent = rpc
        .get_recent_prioritization_fees(writable)
        .await
        .map_err(|e| ExecutorError::Build(e.to_string()))?;
    Ok(recent
        .iter()
        .map(|f| f.prioritization_fee)
        .filter(|fee| *fee > 0)
        .min()
        .unwrap_or(1))
}

/// Payment executor that settles challenges with SPL token transfers.
///
/// Owns the signing [`Credential`]; key material never leaves this type.
/// Generic over [`RpcClientLike`] so tests can run against a mock chain.
pub struct SolanaExecutor<R = RpcClient> {
    credential: Credential,
    rpc: R,
    commitment: CommitmentConfig,
}

impl<R> std::fmt::Debug for SolanaExecutor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaExecutor")
            .field("credential", &self.credential)
            .field("commitment", &self.commitment)
            .finish_non_exhaustive()
    }
}

impl SolanaExecutor<RpcClient> {
    /// Creates an executor against the given RPC endpoint.
    #[must_use]
    pub fn new(credential: Credential, rpc_url: &str) -> Self {
        Self::with_rpc(credential, RpcClient::new(rpc_url.to_owned()))
    }
}

impl<R: RpcClientLike> SolanaExecutor<R> {
    /// Creates an executor over an existing RPC client.
    pub fn with_rpc(credential: Credential, rpc: R) -> Self {
        Self {
            credential,
            rpc,
            commitment: CommitmentConfig::confirmed(),
        }
    }

    /// Sets the commitment level required for payment confirmation.
    #[must_use]
    pub const fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }

    /// Resolves the challenge asset to a mint address, with known decimals
    /// when the asset is a well-known symbol.
    fn resolve_asset(
        challenge: &PaymentChallenge,
        chain_id: &ChainId,
    ) -> Result<(Pubkey, Option<u8>), ExecutorError> {
        if challenge.asset.eq_ignore_ascii_case("usdc") {
            let deployment =
                usdc_deployment(chain_id).ok_or_else(|| ExecutorError::UnsupportedAsset {
                    asset: challenge.asset.clone(),
                    network: chain_id.to_string(),
                })?;
            return Ok((deployment.mint, Some(deployment.decimals)));
        }
        challenge
            .asset
            .parse::<Pubkey>()
            .map(|mint| (mint, None))
            .map_err(|_| ExecutorError::UnsupportedAsset {
                asset: challenge.asset.clone(),
                network: chain_id.to_string(),
            })
    }

    /// Polls until the transaction reaches the configured commitment.
    async fn confirm(&self, signature: &Signature) -> Result<(), ExecutorError> {
        for _ in 0..CONFIRM_ATTEMPTS {
            let confirmed = self
                .rpc
                .confirm_transaction(signature, self.commitment)
                .await
                .map_err(|e| ExecutorError::Confirmation {
                    txid: signature.to_string(),
                    reason: e.to_string(),
                })?;
            if confirmed {
                return Ok(());
            }
            tokio::time::sleep(CONFIRM_INTERVAL).await;
        }
        Err(ExecutorError::Confirmation {
            txid: signature.to_string(),
            reason: "timed out waiting for confirmation".to_owned(),
        })
    }
}

#[async_trait]
impl<R: RpcClientLike> PaymentExecutor for SolanaExecutor<R> {
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "nodo.x402.svm.pay", skip_all, err)
    )]
    async fn pay(&self, challenge: &PaymentChallenge) -> Result<PaymentProof, ExecutorError> {
        let chain_id = challenge.chain_id()?;
        if chain_id.namespace() != "solana" {
            return Err(ExecutorError::UnsupportedNetwork(chain_id.to_string()));
        }

        let (mint_address, known_decimals) = Self::resolve_asset(challenge, &chain_id)?;
        let mint = fetch_mint(&mint_address, &self.rpc).await?;
        if let Some(expected) = known_decimals {
            if expected != mint.decimals() {
                return Err(ExecutorError::Build(format!(
                    "mint {mint_address} reports {} decimals, expected {expected}",
                    mint.decimals()
                )));
            }
        }

        let base_units = amount::to_base_units(challenge.amount, mint.decimals())?;
        let payer = self.credential.pubkey();
        let recipient: Pubkey = challenge.recipient.parse().map_err(|_| {
            ExecutorError::Build(format!(
                "invalid recipient address `{}`",
                challenge.recipient
            ))
        })?;

        let priority = priority_fee_micro_lamports(&self.rpc, &[payer]).await?;
        let instructions = build_payment_instructions(
            &payer,
            &recipient,
            &mint_address,
            mint,
            base_units,
            &challenge.memo,
            priority,
        )?;

        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| ExecutorError::Build(e.to_string()))?;
        let message = MessageV0::try_compile(&payer, &instructions, &[], blockhash)
            .map_err(|e| ExecutorError::Build(format!("{e:?}")))?;
        let transaction = VersionedTransaction::try_new(
            VersionedMessage::V0(message),
            &[self.credential.signer()],
        )
        .map_err(|e| ExecutorError::Signing(e.to_string()))?;

        let signature = self
            .rpc
            .send_transaction(&transaction)
            .await
            .map_err(|e| ExecutorError::Submission(e.to_string()))?;
        #[cfg(feature = "telemetry")]
        debug!(txid = %signature, "Submitted payment transaction");

        self.confirm(&signature).await?;

        Ok(PaymentProof::new(
            signature.to_string(),
            challenge.memo.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::RpcError;
    use solana_account::Account;
    use solana_client::rpc_response::RpcPrioritizationFee;
    use solana_keypair::Keypair;
    use solana_message::Hash;
    use solana_signer::Signer;
    use spl_token::solana_program::program_option::COption;
    use std::sync::{Arc, Mutex};

    fn packed_mint_account(owner: Pubkey, decimals: u8) -> Account {
        let mint = spl_token::state::Mint {
            mint_authority: COption::None,
            supply: 1_000_000_000,
            decimals,
            is_initialized: true,
            freeze_authority: COption::None,
        };
        let mut data = vec![0u8; spl_token::state::Mint::LEN];
        spl_token::state::Mint::pack(mint, &mut data).unwrap();
        Account {
            lamports: 1_461_600,
            data,
            owner,
            executable: false,
            rent_epoch: 0,
        }
    }

    struct MockRpc {
        mint_account: Account,
        sent: Mutex<Option<VersionedTransaction>>,
    }

    impl MockRpc {
        fn with_token_mint(decimals: u8) -> Self {
            Self {
                mint_account: packed_mint_account(spl_token::id(), decimals),
                sent: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl RpcClientLike for MockRpc {
        async fn get_account(&self, _pubkey: &Pubkey) -> Result<Account, RpcError> {
            Ok(self.mint_account.clone())
        }

        async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
            Ok(Hash::default())
        }

        async fn get_recent_prioritization_fees(
            &self,
            _addresses: &[Pubkey],
        ) -> Result<Vec<RpcPrioritizationFee>, RpcError> {
            Ok(vec![
                RpcPrioritizationFee {
                    slot: 1,
                    prioritization_fee: 0,
                },
                RpcPrioritizationFee {
                    slot: 2,
                    prioritization_fee: 7,
                },
            ])
        }

        async fn send_transaction(
            &self,
            transaction: &VersionedTransaction,
        ) -> Result<Signature, RpcError> {
            *self.sent.lock().unwrap() = Some(transaction.clone());
            Ok(transaction.signatures[0])
        }

        async fn confirm_transaction(
            &self,
            _signature: &Signature,
            _commitment: CommitmentConfig,
        ) -> Result<bool, RpcError> {
            Ok(true)
        }
    }

    fn challenge(amount: &str, asset: &str, network: &str, memo: &str) -> PaymentChallenge {
        let recipient = Keypair::new().pubkey().to_string();
        PaymentChallenge::parse(
            &serde_json::to_vec(&serde_json::json!({
                "amount": amount,
                "asset": asset,
                "recipient": recipient,
                "network": network,
                "memo": memo,
            }))
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_memo_instruction_shape() {
        let payer = Keypair::new().pubkey();
        let ix = memo_instruction(&payer, "nodo:req_1");
        assert_eq!(ix.program_id, MEMO_PROGRAM_PUBKEY);
        assert_eq!(ix.data, b"nodo:req_1");
        assert_eq!(ix.accounts.len(), 1);
        assert_eq!(ix.accounts[0].pubkey, payer);
        assert!(ix.accounts[0].is_signer);
    }

    #[test]
    fn test_build_payment_instructions_order() {
        let payer = Keypair::new().pubkey();
        let recipient = Keypair::new().pubkey();
        let mint_address = Keypair::new().pubkey();
        let instructions = build_payment_instructions(
            &payer,
            &recipient,
            &mint_address,
            Mint::Token { decimals: 6 },
            10_000,
            "nodo:req_1",
            7,
        )
        .unwrap();

        assert_eq!(instructions.len(), 3);
        assert_eq!(instructions[1].program_id, MEMO_PROGRAM_PUBKEY);
        let transfer = &instructions[2];
        assert_eq!(transfer.program_id, spl_token::id());
        // TransferChecked discriminator, little-endian amount, decimals
        assert_eq!(transfer.data[0], 12);
        assert_eq!(&transfer.data[1..9], &10_000u64.to_le_bytes());
        assert_eq!(transfer.data[9], 6);
    }

    #[tokio::test]
    async fn test_fetch_mint_token_2022() {
        let rpc = MockRpc {
            mint_account: packed_mint_account(spl_token_2022::id(), 9),
            sent: Mutex::new(None),
        };
        let mint = fetch_mint(&Keypair::new().pubkey(), &rpc).await.unwrap();
        assert!(matches!(mint, Mint::Token2022 { decimals: 9 }));
        assert_eq!(mint.token_program(), spl_token_2022::id());
    }

    #[tokio::test]
    async fn test_pay_builds_memo_bound_transfer() {
        let credential = Credential::from_keypair(Keypair::new());
        let rpc = Arc::new(MockRpc::with_token_mint(6));
        let executor = SolanaExecutor::with_rpc(credential, Arc::clone(&rpc));

        let proof = executor
            .pay(&challenge("0.01", "USDC", "solana", "nodo:req_1"))
            .await
            .unwrap();

        assert_eq!(proof.memo, "nodo:req_1");
        let sent = rpc.sent.lock().unwrap().clone().unwrap();
        assert_eq!(proof.txid, sent.signatures[0].to_string());

        let keys = sent.message.static_account_keys();
        let instructions = sent.message.instructions();
        assert_eq!(instructions.len(), 3);
        assert_eq!(
            keys[instructions[1].program_id_index as usize],
            MEMO_PROGRAM_PUBKEY
        );
        assert_eq!(instructions[1].data, b"nodo:req_1");
        let transfer = &instructions[2];
        assert_eq!(keys[transfer.program_id_index as usize], spl_token::id());
        assert_eq!(&transfer.data[1..9], &10_000u64.to_le_bytes());
    }

    #[tokio::test]
    async fn test_pay_rejects_non_solana_network() {
        let executor = SolanaExecutor::with_rpc(
            Credential::from_keypair(Keypair::new()),
            MockRpc::with_token_mint(6),
        );
        let err = executor
            .pay(&challenge("0.01", "USDC", "eip155:8453", "nodo:req_1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::UnsupportedNetwork(_)));
    }

    #[tokio::test]
    async fn test_pay_rejects_unknown_asset_symbol() {
        let executor = SolanaExecutor::with_rpc(
            Credential::from_keypair(Keypair::new()),
            MockRpc::with_token_mint(6),
        );
        let err = executor
            .pay(&challenge("0.01", "DOGE", "solana", "nodo:req_1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::UnsupportedAsset { .. }));
    }
}
