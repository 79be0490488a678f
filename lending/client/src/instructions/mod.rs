pub mod initialize_bank;
pub mod initialize_user;
pub mod deposit_tokens;
pub mod withdraw_tokens;
pub mod borrow_tokens;
pub mod repay_tokens;
pub mod liquidate;
pub mod shared;

pub use initialize_bank::initialize_bank;
pub use initialize_user::initialize_user;
pub use deposit_tokens::deposit_tokens;
pub use withdraw_tokens::withdraw_tokens;
pub use borrow_tokens::borrow_tokens;
pub use repay_tokens::repay_tokens;
pub use liquidate::liquidate;
pub use shared::PositionAccounts;

use log::debug;
use solana_program::{instruction::Instruction, pubkey::Pubkey};

use crate::{
    config::{ClientConfig, RiskParameters},
    error::{LendingError, ValidationError},
    instruction::Operation,
    pda::AddressDeriver,
    state::{Asset, AssetRegistry},
};

/// An instruction ready for submission, with the base-unit amount it moves.
#[derive(Debug, Clone)]
pub struct BuiltOperation {
    pub operation: Operation,
    pub instruction: Instruction,
    pub amount: Option<u64>,
}

/// Turns user-level parameters into lending program instructions.
///
/// Inputs are validated before any address is derived; protocol accounts are
/// always derived from mints and wallets, never taken from the caller.
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    deriver: AddressDeriver,
    registry: AssetRegistry,
    risk: RiskParameters,
    price_update: Option<Pubkey>,
}

impl OperationBuilder {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            deriver: AddressDeriver::new(config.program_id),
            registry: config.registry(),
            risk: config.risk,
            price_update: config.price_update,
        }
    }

    pub fn deriver(&self) -> &AddressDeriver {
        &self.deriver
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn init_bank(
        &self,
        signer: &Pubkey,
        mint: &Pubkey,
        risk: Option<RiskParameters>,
    ) -> Result<BuiltOperation, LendingError> {
        let asset = self.registry.get(mint)?;
        let risk = risk.unwrap_or(self.risk);
        risk.validate()?;
        let instruction = initialize_bank(&self.deriver, signer, asset, risk)?;
        Ok(self.built(Operation::InitBank, instruction, None))
    }

    pub fn init_user(&self, signer: &Pubkey) -> Result<BuiltOperation, LendingError> {
        let reference = self
            .registry
            .reference()
            .ok_or(ValidationError::MissingReferenceAsset)?;
        let instruction = initialize_user(&self.deriver, signer, &reference.mint)?;
        Ok(self.built(Operation::InitUser, instruction, None))
    }

    pub fn deposit(
        &self,
        signer: &Pubkey,
        mint: &Pubkey,
        amount: &str,
    ) -> Result<BuiltOperation, LendingError> {
        let (accounts, base_units) = self.position(signer, mint, amount)?;
        let instruction = deposit_tokens(&self.deriver, &accounts, base_units)?;
        Ok(self.built(Operation::Deposit, instruction, Some(base_units)))
    }

    pub fn withdraw(
        &self,
        signer: &Pubkey,
        mint: &Pubkey,
        amount: &str,
    ) -> Result<BuiltOperation, LendingError> {
        let (accounts, base_units) = self.position(signer, mint, amount)?;
        let instruction = withdraw_tokens(&self.deriver, &accounts, base_units)?;
        Ok(self.built(Operation::Withdraw, instruction, Some(base_units)))
    }

    pub fn borrow(
        &self,
        signer: &Pubkey,
        mint: &Pubkey,
        amount: &str,
    ) -> Result<BuiltOperation, LendingError> {
        let price_update = self.price_update.ok_or(ValidationError::MissingPriceUpdate)?;
        let (accounts, base_units) = self.position(signer, mint, amount)?;
        let instruction = borrow_tokens(&self.deriver, &accounts, &price_update, base_units)?;
        Ok(self.built(Operation::Borrow, instruction, Some(base_units)))
    }

    pub fn repay(
        &self,
        signer: &Pubkey,
        mint: &Pubkey,
        amount: &str,
    ) -> Result<BuiltOperation, LendingError> {
        let (accounts, base_units) = self.position(signer, mint, amount)?;
        let instruction = repay_tokens(&self.deriver, &accounts, base_units)?;
        Ok(self.built(Operation::Repay, instruction, Some(base_units)))
    }

    pub fn liquidate(
        &self,
        liquidator: &Pubkey,
        collateral_mint: &Pubkey,
        borrowed_mint: &Pubkey,
    ) -> Result<BuiltOperation, LendingError> {
        let price_update = self.price_update.ok_or(ValidationError::MissingPriceUpdate)?;
        let collateral = self.registry.get(collateral_mint)?;
        let borrowed = self.registry.get(borrowed_mint)?;
        // one token program account serves both ATAs
        if collateral.token_program != borrowed.token_program {
            return Err(ValidationError::MixedTokenPrograms.into());
        }
        let instruction = liquidate(&self.deriver, liquidator, &price_update, collateral, borrowed)?;
        Ok(self.built(Operation::Liquidate, instruction, None))
    }

    fn position(
        &self,
        signer: &Pubkey,
        mint: &Pubkey,
        amount: &str,
    ) -> Result<(PositionAccounts, u64), LendingError> {
        let asset: &Asset = self.registry.get(mint)?;
        let base_units = asset.to_base_units(amount)?;
        if base_units == 0 {
            return Err(ValidationError::ZeroAmount.into());
        }
        let accounts = PositionAccounts::derive(&self.deriver, signer, asset)?;
        Ok((accounts, base_units))
    }

    fn built(
        &self,
        operation: Operation,
        instruction: Instruction,
        amount: Option<u64>,
    ) -> BuiltOperation {
        debug!(
            "built {} with {} accounts{}",
            operation,
            instruction.accounts.len(),
            amount.map(|a| format!(", amount {a}")).unwrap_or_default()
        );
        BuiltOperation {
            operation,
            instruction,
            amount,
        }
    }
}
