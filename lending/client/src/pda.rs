use log::trace;
use solana_program::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address_with_program_id;

use crate::{error::DerivationError, state::Asset};

pub const TREASURY_SEED: &[u8] = b"treasury";

/// Addresses created together by `initialize_bank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankAddresses {
    pub bank: Pubkey,
    pub treasury: Pubkey,
}

/// Single source of the lending program's seed scheme.
///
/// Every protocol-owned account is re-derived here on each use:
/// bank `[mint]`, treasury `["treasury", mint]`, user `[wallet]`.
#[derive(Debug, Clone, Copy)]
pub struct AddressDeriver {
    program_id: Pubkey,
}

impl AddressDeriver {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn derive(
        &self,
        label: &'static str,
        seeds: &[&[u8]],
    ) -> Result<(Pubkey, u8), DerivationError> {
        let (address, bump) = Pubkey::try_find_program_address(seeds, &self.program_id).ok_or(
            DerivationError::NoViableBump {
                label,
                program_id: self.program_id,
            },
        )?;
        trace!("derived {} PDA {} (bump {})", label, address, bump);
        Ok((address, bump))
    }

    pub fn bank(&self, mint: &Pubkey) -> Result<Pubkey, DerivationError> {
        self.derive("bank", &[mint.as_ref()]).map(|(address, _)| address)
    }

    pub fn treasury(&self, mint: &Pubkey) -> Result<Pubkey, DerivationError> {
        self.derive("treasury", &[TREASURY_SEED, mint.as_ref()])
            .map(|(address, _)| address)
    }

    pub fn user_account(&self, wallet: &Pubkey) -> Result<Pubkey, DerivationError> {
        self.derive("user", &[wallet.as_ref()]).map(|(address, _)| address)
    }

    pub fn bank_addresses(&self, mint: &Pubkey) -> Result<BankAddresses, DerivationError> {
        Ok(BankAddresses {
            bank: self.bank(mint)?,
            treasury: self.treasury(mint)?,
        })
    }

    /// Associated token account; follows the SPL rule, not this program's seeds.
    pub fn user_token_account(&self, wallet: &Pubkey, asset: &Asset) -> Pubkey {
        get_associated_token_address_with_program_id(wallet, &asset.mint, &asset.token_program)
    }
}
