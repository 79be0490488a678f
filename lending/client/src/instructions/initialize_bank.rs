use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::shared::lending_instruction;
use crate::{
    config::RiskParameters, error::LendingError, instruction::LendingInstruction,
    pda::AddressDeriver, state::Asset,
};

/// Accounts:
/// [signer writable] signer
/// [readonly mint]
/// [writable bank] PDA `[mint]`
/// [writable treasury] PDA `["treasury", mint]`
/// [readonly token program]
/// [readonly system program]
pub fn initialize_bank(
    deriver: &AddressDeriver,
    signer: &Pubkey,
    asset: &Asset,
    risk: RiskParameters,
) -> Result<Instruction, LendingError> {
    let addresses = deriver.bank_addresses(&asset.mint)?;

    let accounts = vec![
        AccountMeta::new(*signer, true),
        AccountMeta::new_readonly(asset.mint, false),
        AccountMeta::new(addresses.bank, false),
        AccountMeta::new(addresses.treasury, false),
        AccountMeta::new_readonly(asset.token_program, false),
        AccountMeta::new_readonly(solana_system_interface::program::ID, false),
    ];

    lending_instruction(
        deriver,
        LendingInstruction::InitializeBank {
            liquidation_threshold: risk.liquidation_threshold,
            max_ltv: risk.max_ltv,
        },
        accounts,
    )
}
