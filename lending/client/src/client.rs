use std::sync::Arc;

use log::{info, warn};
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::{
    balance::{BalanceReader, Balances, TokenBalance},
    config::{ClientConfig, RiskParameters},
    error::{ChainError, LendingError, RejectReason, SubmitError},
    instruction::Operation,
    instructions::{BuiltOperation, OperationBuilder},
    pda::AddressDeriver,
    rpc::{ChainReader, WalletSigner},
    state::AssetRegistry,
    submitter::TransactionSubmitter,
};

/// Result of a confirmed operation.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub operation: Operation,
    pub signature: Signature,
    /// Amount moved, in base units
    pub amount: Option<u64>,
    /// Balances read after confirmation; `None` if the refresh failed
    pub balances: Option<Balances>,
}

/// Entry point for every lending operation.
///
/// The wallet is passed to each call; the client keeps no wallet state and
/// does not serialize concurrent calls.
pub struct LendingClient<C: ChainReader + ?Sized> {
    chain: Arc<C>,
    builder: OperationBuilder,
    submitter: TransactionSubmitter<C>,
    balances: BalanceReader<C>,
}

impl<C: ChainReader + ?Sized> LendingClient<C> {
    pub fn new(chain: Arc<C>, config: &ClientConfig) -> Self {
        let builder = OperationBuilder::new(config);
        let balances = BalanceReader::new(chain.clone(), *builder.deriver());
        Self {
            submitter: TransactionSubmitter::new(chain.clone(), config),
            chain,
            builder,
            balances,
        }
    }

    pub fn deriver(&self) -> &AddressDeriver {
        self.builder.deriver()
    }

    pub fn registry(&self) -> &AssetRegistry {
        self.builder.registry()
    }

    /// Creates the bank and treasury for `mint` with the configured risk parameters.
    pub async fn init_bank<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        mint: &Pubkey,
    ) -> Result<OperationOutcome, LendingError> {
        self.init_bank_with(wallet, mint, None).await
    }

    pub async fn init_bank_with<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        mint: &Pubkey,
        risk: Option<RiskParameters>,
    ) -> Result<OperationOutcome, LendingError> {
        let built = self.builder.init_bank(&wallet.pubkey(), mint, risk)?;
        let bank = self.deriver().bank(mint)?;
        self.ensure_uninitialized(Operation::InitBank, &bank).await?;

        self.execute(wallet, built).await
    }

    pub async fn init_user<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
    ) -> Result<OperationOutcome, LendingError> {
        let built = self.builder.init_user(&wallet.pubkey())?;
        let user_account = self.deriver().user_account(&wallet.pubkey())?;
        self.ensure_uninitialized(Operation::InitUser, &user_account)
            .await?;

        self.execute(wallet, built).await
    }

    pub async fn deposit<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        mint: &Pubkey,
        amount: &str,
    ) -> Result<OperationOutcome, LendingError> {
        let built = self.builder.deposit(&wallet.pubkey(), mint, amount)?;
        self.execute(wallet, built).await
    }

    pub async fn withdraw<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        mint: &Pubkey,
        amount: &str,
    ) -> Result<OperationOutcome, LendingError> {
        let built = self.builder.withdraw(&wallet.pubkey(), mint, amount)?;
        self.execute(wallet, built).await
    }

    pub async fn borrow<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        mint: &Pubkey,
        amount: &str,
    ) -> Result<OperationOutcome, LendingError> {
        let built = self.builder.borrow(&wallet.pubkey(), mint, amount)?;
        self.execute(wallet, built).await
    }

    pub async fn repay<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        mint: &Pubkey,
        amount: &str,
    ) -> Result<OperationOutcome, LendingError> {
        let built = self.builder.repay(&wallet.pubkey(), mint, amount)?;
        self.execute(wallet, built).await
    }

    pub async fn liquidate<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        collateral_mint: &Pubkey,
        borrowed_mint: &Pubkey,
    ) -> Result<OperationOutcome, LendingError> {
        let built = self
            .builder
            .liquidate(&wallet.pubkey(), collateral_mint, borrowed_mint)?;
        self.execute(wallet, built).await
    }

    pub async fn refresh_balances(&self, wallet: &Pubkey) -> Result<Balances, ChainError> {
        self.balances.read_all(wallet, self.registry()).await
    }

    pub async fn read_native(&self, wallet: &Pubkey) -> Result<u64, ChainError> {
        self.balances.read_native(wallet).await
    }

    pub async fn read_token(
        &self,
        wallet: &Pubkey,
        mint: &Pubkey,
    ) -> Result<TokenBalance, LendingError> {
        let asset = self.registry().get(mint)?;
        Ok(self.balances.read_token(wallet, asset).await?)
    }

    async fn execute<W: WalletSigner + ?Sized>(
        &self,
        wallet: &W,
        built: BuiltOperation,
    ) -> Result<OperationOutcome, LendingError> {
        let operation = built.operation;
        let signature = self
            .submitter
            .submit(wallet, operation, &[built.instruction])
            .await
            .map_err(|source| LendingError::Submit { operation, source })?;

        let owner = wallet.pubkey();
        let balances = match self.refresh_balances(&owner).await {
            Ok(balances) => Some(balances),
            Err(e) => {
                warn!("{} confirmed but balance refresh failed: {}", operation, e);
                None
            }
        };

        Ok(OperationOutcome {
            operation,
            signature,
            amount: built.amount,
            balances,
        })
    }

    // Pre-check only: a failed lookup falls through to the chain's own rejection
    async fn ensure_uninitialized(
        &self,
        operation: Operation,
        address: &Pubkey,
    ) -> Result<(), LendingError> {
        match self.chain.account_exists(address).await {
            Ok(false) => Ok(()),
            Ok(true) => {
                info!("{}: account {} already exists", operation, address);
                Err(LendingError::Submit {
                    operation,
                    source: SubmitError::Rejected {
                        reason: RejectReason::AccountAlreadyExists,
                    },
                })
            }
            Err(e) => {
                warn!("{}: could not check {}: {}, submitting anyway", operation, address, e);
                Ok(())
            }
        }
    }
}
