use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::{
    error::{DerivationError, LendingError},
    instruction::LendingInstruction,
    pda::AddressDeriver,
    state::Asset,
};

// Accounts touched by every position-changing instruction (deposit, withdraw, borrow, repay)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionAccounts {
    pub signer: Pubkey,
    pub mint: Pubkey,
    pub bank: Pubkey,
    pub treasury: Pubkey,
    pub user_account: Pubkey,
    pub user_token_account: Pubkey,
    pub token_program: Pubkey,
}

impl PositionAccounts {
    pub fn derive(
        deriver: &AddressDeriver,
        signer: &Pubkey,
        asset: &Asset,
    ) -> Result<Self, DerivationError> {
        let bank = deriver.bank_addresses(&asset.mint)?;
        Ok(Self {
            signer: *signer,
            mint: asset.mint,
            bank: bank.bank,
            treasury: bank.treasury,
            user_account: deriver.user_account(signer)?,
            user_token_account: deriver.user_token_account(signer, asset),
            token_program: asset.token_program,
        })
    }

    // signer, mint, bank, treasury, user, user_token_account: the prefix every position instruction shares
    pub fn leading_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.signer, true),
            AccountMeta::new_readonly(self.mint, false),
            AccountMeta::new(self.bank, false),
            AccountMeta::new(self.treasury, false),
            AccountMeta::new(self.user_account, false),
            AccountMeta::new(self.user_token_account, false),
        ]
    }
}

pub fn lending_instruction(
    deriver: &AddressDeriver,
    args: LendingInstruction,
    accounts: Vec<AccountMeta>,
) -> Result<Instruction, LendingError> {
    Ok(Instruction {
        program_id: *deriver.program_id(),
        accounts,
        data: args.pack()?,
    })
}
