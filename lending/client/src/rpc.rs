use async_trait::async_trait;
use solana_program::{hash::Hash, message::Message, pubkey::Pubkey};
use solana_sdk::{
    commitment_config::CommitmentConfig, signature::Signature, transaction::TransactionError,
};

use crate::error::{ChainError, WalletError};

/// Raw token account balance as reported by the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    pub amount: u64,
    pub decimals: u8,
}

/// Read side of the chain RPC service.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Lamports held by `address`; zero for unknown accounts.
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ChainError>;

    /// `None` when no token account exists at `address`.
    async fn get_token_account_balance(
        &self,
        address: &Pubkey,
    ) -> Result<Option<TokenAmount>, ChainError>;

    async fn account_exists(&self, address: &Pubkey) -> Result<bool, ChainError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, ChainError>;

    /// `None` while the transaction has not reached `commitment`.
    async fn get_signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Option<Result<(), TransactionError>>, ChainError>;
}

/// Wallet capability: signs a message (possibly prompting the user) and sends it.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    async fn sign_and_send(&self, message: Message) -> Result<Signature, WalletError>;
}
