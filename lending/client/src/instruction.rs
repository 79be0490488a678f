use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{hash::hash, pubkey::Pubkey};

pub const DISCRIMINATOR_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    InitBank,
    InitUser,
    Deposit,
    Withdraw,
    Borrow,
    Repay,
    Liquidate,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::InitBank,
        Operation::InitUser,
        Operation::Deposit,
        Operation::Withdraw,
        Operation::Borrow,
        Operation::Repay,
        Operation::Liquidate,
    ];

    /// Instruction name in the program's interface.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::InitBank => "initialize_bank",
            Operation::InitUser => "initialize_user",
            Operation::Deposit => "deposit",
            Operation::Withdraw => "withdraw",
            Operation::Borrow => "borrow",
            Operation::Repay => "repay",
            Operation::Liquidate => "liquidate",
        }
    }

    /// InitBank and InitUser create program accounts; every other operation moves tokens.
    pub fn creates_account(&self) -> bool {
        matches!(self, Operation::InitBank | Operation::InitUser)
    }

    /// First 8 bytes of `sha256("global:<name>")`, the Anchor method selector.
    pub fn discriminator(&self) -> [u8; DISCRIMINATOR_LEN] {
        let preimage = format!("global:{}", self.name());
        let mut out = [0u8; DISCRIMINATOR_LEN];
        out.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..DISCRIMINATOR_LEN]);
        out
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, BorshSerialize, BorshDeserialize)]
struct InitBankArgs {
    liquidation_threshold: u64,
    max_ltv: u64,
}

#[derive(Debug, BorshSerialize, BorshDeserialize)]
struct InitUserArgs {
    usdc_address: [u8; 32],
}

/// Arguments of every lending program instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LendingInstruction {
    InitializeBank {
        liquidation_threshold: u64,
        max_ltv: u64,
    },
    InitializeUser {
        usdc_address: Pubkey,
    },
    Deposit {
        amount: u64,
    },
    Withdraw {
        amount: u64,
    },
    Borrow {
        amount: u64,
    },
    Repay {
        amount: u64,
    },
    Liquidate,
}

impl LendingInstruction {
    pub fn operation(&self) -> Operation {
        match self {
            LendingInstruction::InitializeBank { .. } => Operation::InitBank,
            LendingInstruction::InitializeUser { .. } => Operation::InitUser,
            LendingInstruction::Deposit { .. } => Operation::Deposit,
            LendingInstruction::Withdraw { .. } => Operation::Withdraw,
            LendingInstruction::Borrow { .. } => Operation::Borrow,
            LendingInstruction::Repay { .. } => Operation::Repay,
            LendingInstruction::Liquidate => Operation::Liquidate,
        }
    }

    /// Discriminator followed by the borsh-encoded arguments.
    pub fn pack(&self) -> borsh::io::Result<Vec<u8>> {
        let mut data = self.operation().discriminator().to_vec();
        let args = match self {
            LendingInstruction::InitializeBank {
                liquidation_threshold,
                max_ltv,
            } => borsh::to_vec(&InitBankArgs {
                liquidation_threshold: *liquidation_threshold,
                max_ltv: *max_ltv,
            })?,
            LendingInstruction::InitializeUser { usdc_address } => borsh::to_vec(&InitUserArgs {
                usdc_address: usdc_address.to_bytes(),
            })?,
            LendingInstruction::Deposit { amount }
            | LendingInstruction::Withdraw { amount }
            | LendingInstruction::Borrow { amount }
            | LendingInstruction::Repay { amount } => borsh::to_vec(amount)?,
            LendingInstruction::Liquidate => Vec::new(),
        };
        data.extend(args);
        Ok(data)
    }

    pub fn unpack(data: &[u8]) -> Option<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return None;
        }
        let (selector, mut args) = data.split_at(DISCRIMINATOR_LEN);
        let operation = Operation::ALL
            .into_iter()
            .find(|op| op.discriminator() == selector)?;

        let instruction = match operation {
            Operation::InitBank => {
                let args = InitBankArgs::deserialize(&mut args).ok()?;
                LendingInstruction::InitializeBank {
                    liquidation_threshold: args.liquidation_threshold,
                    max_ltv: args.max_ltv,
                }
            }
            Operation::InitUser => {
                let args = InitUserArgs::deserialize(&mut args).ok()?;
                LendingInstruction::InitializeUser {
                    usdc_address: Pubkey::new_from_array(args.usdc_address),
                }
            }
            Operation::Deposit => LendingInstruction::Deposit {
                amount: u64::deserialize(&mut args).ok()?,
            },
            Operation::Withdraw => LendingInstruction::Withdraw {
                amount: u64::deserialize(&mut args).ok()?,
            },
            Operation::Borrow => LendingInstruction::Borrow {
                amount: u64::deserialize(&mut args).ok()?,
            },
            Operation::Repay => LendingInstruction::Repay {
                amount: u64::deserialize(&mut args).ok()?,
            },
            Operation::Liquidate => LendingInstruction::Liquidate,
        };

        args.is_empty().then_some(instruction)
    }
}
