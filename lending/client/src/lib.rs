//! Client for the lending program: PDA derivation, instruction building,
//! submission and balance reads.

pub mod balance;
pub mod client;
pub mod config;
pub mod error;
pub mod instruction;
pub mod instructions;
pub mod pda;
pub mod rpc;
pub mod state;
pub mod submitter;

pub use balance::{BalanceReader, Balances, TokenBalance};
pub use client::{LendingClient, OperationOutcome};
pub use config::{ClientConfig, RiskParameters};
pub use error::{LendingError, RejectReason, SubmitError, ValidationError};
pub use instruction::{LendingInstruction, Operation};
pub use instructions::{BuiltOperation, OperationBuilder};
pub use pda::AddressDeriver;
pub use rpc::{ChainReader, TokenAmount, WalletSigner};
pub use state::{Asset, AssetRegistry};
pub use submitter::TransactionSubmitter;
