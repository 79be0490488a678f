use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::shared::lending_instruction;
use crate::{error::LendingError, instruction::LendingInstruction, pda::AddressDeriver};

/// Accounts:
/// [signer writable] signer
/// [writable user_account] PDA `[signer]`
/// [readonly system program]
pub fn initialize_user(
    deriver: &AddressDeriver,
    signer: &Pubkey,
    reference_mint: &Pubkey,
) -> Result<Instruction, LendingError> {
    let user_account = deriver.user_account(signer)?;

    let accounts = vec![
        AccountMeta::new(*signer, true),
        AccountMeta::new(user_account, false),
        AccountMeta::new_readonly(solana_system_interface::program::ID, false),
    ];

    lending_instruction(
        deriver,
        LendingInstruction::InitializeUser {
            usdc_address: *reference_mint,
        },
        accounts,
    )
}
