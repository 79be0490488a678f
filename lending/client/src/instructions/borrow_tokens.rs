use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::shared::{PositionAccounts, lending_instruction};
use crate::{error::LendingError, instruction::LendingInstruction, pda::AddressDeriver};

/// Accounts:
/// [signer writable] signer
/// [readonly mint]
/// [writable bank]
/// [writable treasury]
/// [writable user_account]
/// [writable user_token_account] created by the program if missing
/// [readonly associated token program]
/// [readonly token program]
/// [readonly system program]
/// [readonly price_update] Pyth price feed
pub fn borrow_tokens(
    deriver: &AddressDeriver,
    accounts: &PositionAccounts,
    price_update: &Pubkey,
    amount: u64,
) -> Result<Instruction, LendingError> {
    let mut metas = accounts.leading_metas();
    metas.extend([
        AccountMeta::new_readonly(spl_associated_token_account::ID, false),
        AccountMeta::new_readonly(accounts.token_program, false),
        AccountMeta::new_readonly(solana_system_interface::program::ID, false),
        AccountMeta::new_readonly(*price_update, false),
    ]);

    lending_instruction(deriver, LendingInstruction::Borrow { amount }, metas)
}
