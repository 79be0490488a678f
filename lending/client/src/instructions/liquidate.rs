use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::shared::lending_instruction;
use crate::{error::LendingError, instruction::LendingInstruction, pda::AddressDeriver, state::Asset};

/// Accounts:
/// [signer writable] liquidator
/// [readonly price_update]
/// [readonly collateral mint]
/// [readonly borrowed mint]
/// [writable collateral bank]
/// [writable borrowed bank]
/// [writable collateral treasury]
/// [writable borrowed treasury]
/// [writable user_account] PDA `[liquidator]`
/// [writable liquidator collateral ATA]
/// [writable liquidator borrowed ATA]
/// [readonly associated token program]
/// [readonly token program]
/// [readonly system program]
pub fn liquidate(
    deriver: &AddressDeriver,
    liquidator: &Pubkey,
    price_update: &Pubkey,
    collateral: &Asset,
    borrowed: &Asset,
) -> Result<Instruction, LendingError> {
    let collateral_bank = deriver.bank_addresses(&collateral.mint)?;
    let borrowed_bank = deriver.bank_addresses(&borrowed.mint)?;

    let accounts = vec![
        AccountMeta::new(*liquidator, true),
        AccountMeta::new_readonly(*price_update, false),
        AccountMeta::new_readonly(collateral.mint, false),
        AccountMeta::new_readonly(borrowed.mint, false),
        AccountMeta::new(collateral_bank.bank, false),
        AccountMeta::new(borrowed_bank.bank, false),
        AccountMeta::new(collateral_bank.treasury, false),
        AccountMeta::new(borrowed_bank.treasury, false),
        AccountMeta::new(deriver.user_account(liquidator)?, false),
        AccountMeta::new(deriver.user_token_account(liquidator, collateral), false),
        AccountMeta::new(deriver.user_token_account(liquidator, borrowed), false),
        AccountMeta::new_readonly(spl_associated_token_account::ID, false),
        AccountMeta::new_readonly(collateral.token_program, false),
        AccountMeta::new_readonly(solana_system_interface::program::ID, false),
    ];

    lending_instruction(
        deriver,
        LendingInstruction::Liquidate,
        accounts,
    )
}
