use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use solana_program::pubkey::Pubkey;
use solana_sdk::{instruction::InstructionError, signature::Signature, transaction::TransactionError};
use thiserror::Error;

use crate::instruction::Operation;

/// Anchor numbers user-defined program errors from this offset.
pub const ANCHOR_ERROR_OFFSET: u32 = 6000;

/// System program `AccountAlreadyInUse`, raised when an `init` targets an existing PDA.
const ACCOUNT_ALREADY_IN_USE: u32 = 0;

/// spl-token `InsufficientFunds`, surfaced through the program's token CPI.
const TOKEN_INSUFFICIENT_FUNDS: u32 = spl_token::error::TokenError::InsufficientFunds as u32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Amount is empty")]
    EmptyAmount,

    #[error("Amount `{0}` is not a number")]
    InvalidAmount(String),

    #[error("Amount `{0}` is negative")]
    NegativeAmount(String),

    #[error("Zero amount")]
    ZeroAmount,

    #[error("Amount `{amount}` does not fit in base units with {decimals} decimals")]
    AmountOverflow { amount: String, decimals: u8 },

    #[error("Unknown asset {0}")]
    UnknownAsset(Pubkey),

    #[error("No price update account configured")]
    MissingPriceUpdate,

    #[error("No reference asset configured")]
    MissingReferenceAsset,

    #[error("Risk parameter {name} = {value} is not a percentage")]
    InvalidRiskParameter { name: &'static str, value: u64 },

    #[error("Collateral and borrowed assets use different token programs")]
    MixedTokenPrograms,
}

// Fatal: the seed shapes are fixed, so this only happens on a program/version mismatch
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DerivationError {
    #[error("No viable bump for {label} seeds under program {program_id}")]
    NoViableBump { label: &'static str, program_id: Pubkey },
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("RPC error: {0}")]
    Rpc(String),
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("User rejected the signature request")]
    UserRejected,

    #[error("Transaction rejected: {0}")]
    Rejected(TransactionError),

    #[error("Wallet transport error: {0}")]
    Transport(String),
}

/// Custom errors raised by the on-chain lending program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, Error)]
pub enum LendingProgramError {
    #[error("Insufficient funds for this operation")]
    InsufficientFunds = 6000,

    #[error("Request exceeds borrowable amount")]
    OverBorrowableAmount = 6001,

    #[error("Over repay amount")]
    OverRepay = 6002,

    #[error("Health factor is above 1.0, liquidation not required")]
    HealthFactorAboveOne = 6003,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("account already exists")]
    AccountAlreadyExists,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("program error: {0}")]
    Program(LendingProgramError),

    #[error("{0}")]
    Other(String),
}

impl RejectReason {
    /// Decodes a failed transaction. Custom codes are read in the context of
    /// `operation`: code 0 is the system program's "already in use" only for
    /// account creation, and code 1 is spl-token's insufficient funds only for
    /// token-moving operations.
    pub fn decode(operation: Operation, err: TransactionError) -> Self {
        match err {
            TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
                if let Some(program_err) = LendingProgramError::from_u32(code) {
                    return RejectReason::Program(program_err);
                }
                match code {
                    ACCOUNT_ALREADY_IN_USE if operation.creates_account() => {
                        RejectReason::AccountAlreadyExists
                    }
                    TOKEN_INSUFFICIENT_FUNDS if !operation.creates_account() => {
                        RejectReason::InsufficientFunds
                    }
                    _ => RejectReason::Other(format!("custom program error {code:#x}")),
                }
            }
            TransactionError::InstructionError(_, InstructionError::AccountAlreadyInitialized) => {
                RejectReason::AccountAlreadyExists
            }
            TransactionError::InsufficientFundsForFee
            | TransactionError::InsufficientFundsForRent { .. }
            | TransactionError::InstructionError(_, InstructionError::InsufficientFunds) => {
                RejectReason::InsufficientFunds
            }
            other => RejectReason::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("User rejected the transaction")]
    UserRejected,

    #[error("Transaction rejected: {reason}")]
    Rejected { reason: RejectReason },

    // The transaction may still land; callers must not treat this as failure
    #[error("Transaction {signature} not confirmed in time, outcome unknown")]
    Unconfirmed { signature: Signature },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl SubmitError {
    pub fn is_already_initialized(&self) -> bool {
        matches!(
            self,
            SubmitError::Rejected {
                reason: RejectReason::AccountAlreadyExists
            }
        )
    }
}

impl SubmitError {
    pub fn from_wallet(operation: Operation, err: WalletError) -> Self {
        match err {
            WalletError::UserRejected => SubmitError::UserRejected,
            WalletError::Rejected(tx_err) => SubmitError::Rejected {
                reason: RejectReason::decode(operation, tx_err),
            },
            WalletError::Transport(msg) => SubmitError::Transport(msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Reference asset `{0}` is not in the asset table")]
    UnknownReferenceAsset(String),

    #[error("Asset {0} is listed twice")]
    DuplicateAsset(Pubkey),

    #[error("Asset `{symbol}` declares {decimals} decimals, at most {max} supported")]
    UnsupportedDecimals { symbol: String, decimals: u8, max: u8 },

    #[error("Invalid risk parameters: {0}")]
    InvalidRisk(#[source] ValidationError),
}

#[derive(Debug, Error)]
pub enum LendingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Failed to encode instruction: {0}")]
    Encoding(#[from] borsh::io::Error),

    #[error("{operation} failed: {source}")]
    Submit {
        operation: Operation,
        #[source]
        source: SubmitError,
    },
}

impl LendingError {
    /// True when InitBank / InitUser hit an account that already exists.
    pub fn is_already_initialized(&self) -> bool {
        match self {
            LendingError::Submit { operation, source } => {
                operation.creates_account() && source.is_already_initialized()
            }
            _ => false,
        }
    }
}
