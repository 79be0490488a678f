#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use solana_program::{hash::Hash, message::Message, pubkey::Pubkey};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::InstructionError,
    signature::Signature,
    transaction::TransactionError,
};
use spl_lending_client::{
    ChainReader, ClientConfig, LendingInstruction, TokenAmount, WalletSigner,
    error::{ChainError, WalletError},
};

pub const FEE_LAMPORTS: u64 = 5_000;

/// In-memory view of the chain the mocks read and mutate.
#[derive(Default)]
pub struct Ledger {
    pub lamports: HashMap<Pubkey, u64>,
    pub token_accounts: HashMap<Pubkey, u64>,
    pub accounts: HashSet<Pubkey>,
    pub statuses: HashMap<Signature, Result<(), TransactionError>>,
    /// Status never reaches the requested commitment
    pub hold_confirmations: bool,
    /// Next sent transaction lands but fails with this error
    pub next_failure: Option<TransactionError>,
    pub fail_existence_checks: bool,
    pub existence_checks: usize,
    pub fail_balance_reads: bool,
    pub blockhash_requests: usize,
}

#[derive(Default)]
pub struct MockChain {
    pub ledger: Mutex<Ledger>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.ledger.lock().unwrap())
    }

    pub fn fund(&self, wallet: &Pubkey, lamports: u64) {
        self.with(|l| l.lamports.insert(*wallet, lamports));
    }

    pub fn set_token_balance(&self, token_account: &Pubkey, amount: u64) {
        self.with(|l| {
            l.accounts.insert(*token_account);
            l.token_accounts.insert(*token_account, amount)
        });
    }

    pub fn token_balance(&self, token_account: &Pubkey) -> Option<u64> {
        self.with(|l| l.token_accounts.get(token_account).copied())
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ChainError> {
        self.with(|l| {
            if l.fail_balance_reads {
                return Err(ChainError::Rpc("node is behind".into()));
            }
            Ok(l.lamports.get(address).copied().unwrap_or(0))
        })
    }

    async fn get_token_account_balance(
        &self,
        address: &Pubkey,
    ) -> Result<Option<TokenAmount>, ChainError> {
        self.with(|l| {
            if l.fail_balance_reads {
                return Err(ChainError::Rpc("node is behind".into()));
            }
            Ok(l.token_accounts.get(address).map(|amount| TokenAmount {
                amount: *amount,
                decimals: 6,
            }))
        })
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool, ChainError> {
        self.with(|l| {
            l.existence_checks += 1;
            if l.fail_existence_checks {
                return Err(ChainError::Rpc("getAccountInfo timed out".into()));
            }
            Ok(l.accounts.contains(address))
        })
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ChainError> {
        self.with(|l| l.blockhash_requests += 1);
        Ok(Hash::new_from_array([7; 32]))
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> Result<Option<Result<(), TransactionError>>, ChainError> {
        self.with(|l| {
            if l.hold_confirmations {
                return Ok(None);
            }
            Ok(l.statuses.get(signature).cloned())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletMode {
    Approve,
    Decline,
}

/// Wallet that "executes" lending instructions against the mock ledger.
pub struct MockWallet {
    pub key: Pubkey,
    chain: Arc<MockChain>,
    mode: Mutex<WalletMode>,
    sent: Mutex<Vec<Message>>,
    counter: AtomicU64,
}

impl MockWallet {
    pub fn new(chain: Arc<MockChain>) -> Self {
        Self {
            key: Pubkey::new_unique(),
            chain,
            mode: Mutex::new(WalletMode::Approve),
            sent: Mutex::new(Vec::new()),
            counter: AtomicU64::new(1),
        }
    }

    pub fn set_mode(&self, mode: WalletMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_sent(&self) -> Option<Message> {
        self.sent.lock().unwrap().last().cloned()
    }

    fn next_signature(&self) -> Signature {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(self.key.as_ref());
        bytes[32..40].copy_from_slice(&n.to_le_bytes());
        Signature::from(bytes)
    }
}

fn reject(index: u8, code: u32) -> WalletError {
    WalletError::Rejected(TransactionError::InstructionError(
        index,
        InstructionError::Custom(code),
    ))
}

fn transfer(ledger: &mut Ledger, from: &Pubkey, to: &Pubkey, amount: u64, index: u8) -> Result<(), WalletError> {
    let available = ledger.token_accounts.get(from).copied().unwrap_or(0);
    if available < amount {
        // spl-token InsufficientFunds
        return Err(reject(index, 1));
    }
    ledger.token_accounts.insert(*from, available - amount);
    *ledger.token_accounts.entry(*to).or_insert(0) += amount;
    ledger.accounts.insert(*to);
    Ok(())
}

// Applies the effects a successful preflight + execution would have
fn apply(ledger: &mut Ledger, message: &Message) -> Result<(), WalletError> {
    for (index, ix) in message.instructions.iter().enumerate() {
        let index = index as u8;
        let keys: Vec<Pubkey> = ix
            .accounts
            .iter()
            .map(|i| message.account_keys[*i as usize])
            .collect();
        let Some(decoded) = LendingInstruction::unpack(&ix.data) else {
            return Err(WalletError::Rejected(TransactionError::InstructionError(
                index,
                InstructionError::InvalidInstructionData,
            )));
        };

        match decoded {
            LendingInstruction::InitializeBank { .. } => {
                let (bank, treasury) = (keys[2], keys[3]);
                if ledger.accounts.contains(&bank) {
                    return Err(reject(index, 0));
                }
                ledger.accounts.insert(bank);
                ledger.accounts.insert(treasury);
                ledger.token_accounts.insert(treasury, 0);
            }
            LendingInstruction::InitializeUser { .. } => {
                let user = keys[1];
                if ledger.accounts.contains(&user) {
                    return Err(reject(index, 0));
                }
                ledger.accounts.insert(user);
            }
            LendingInstruction::Deposit { amount } | LendingInstruction::Repay { amount } => {
                let (treasury, user_token) = (keys[3], keys[5]);
                transfer(ledger, &user_token, &treasury, amount, index)?;
            }
            LendingInstruction::Withdraw { amount } | LendingInstruction::Borrow { amount } => {
                let (treasury, user_token) = (keys[3], keys[5]);
                transfer(ledger, &treasury, &user_token, amount, index)?;
            }
            LendingInstruction::Liquidate => {}
        }
    }
    Ok(())
}

#[async_trait]
impl WalletSigner for MockWallet {
    fn pubkey(&self) -> Pubkey {
        self.key
    }

    async fn sign_and_send(&self, message: Message) -> Result<Signature, WalletError> {
        if *self.mode.lock().unwrap() == WalletMode::Decline {
            return Err(WalletError::UserRejected);
        }
        self.sent.lock().unwrap().push(message.clone());
        let signature = self.next_signature();

        self.chain.with(|ledger| {
            if let Some(err) = ledger.next_failure.take() {
                ledger.statuses.insert(signature, Err(err));
                return Ok(signature);
            }
            // preflight simulation
            let mut simulated = Ledger {
                lamports: ledger.lamports.clone(),
                token_accounts: ledger.token_accounts.clone(),
                accounts: ledger.accounts.clone(),
                ..Default::default()
            };
            apply(&mut simulated, &message)?;

            ledger.token_accounts = simulated.token_accounts;
            ledger.accounts = simulated.accounts;
            let lamports = ledger.lamports.entry(self.key).or_insert(0);
            *lamports = lamports.saturating_sub(FEE_LAMPORTS);
            ledger.statuses.insert(signature, Ok(()));
            Ok(signature)
        })
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig {
        price_update: Some(Pubkey::new_unique()),
        confirm_timeout_ms: 200,
        poll_interval_ms: 5,
        ..ClientConfig::default()
    }
}
