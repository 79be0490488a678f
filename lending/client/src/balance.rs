use std::{collections::BTreeMap, sync::Arc};

use futures::future::join_all;
use log::{debug, trace};
use solana_program::pubkey::Pubkey;

use crate::{
    error::ChainError,
    pda::AddressDeriver,
    rpc::ChainReader,
    state::{Asset, AssetRegistry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenBalance {
    /// The wallet has no token account for the asset
    Absent,
    Present { amount: u64 },
}

impl TokenBalance {
    pub fn amount(&self) -> u64 {
        match self {
            TokenBalance::Absent => 0,
            TokenBalance::Present { amount } => *amount,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, TokenBalance::Absent)
    }
}

/// Point-in-time balances of a wallet; safe to discard and re-read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    pub native: u64,
    pub tokens: BTreeMap<Pubkey, TokenBalance>,
}

impl Balances {
    pub fn token(&self, mint: &Pubkey) -> TokenBalance {
        self.tokens.get(mint).copied().unwrap_or(TokenBalance::Absent)
    }
}

pub struct BalanceReader<C: ChainReader + ?Sized> {
    chain: Arc<C>,
    deriver: AddressDeriver,
}

impl<C: ChainReader + ?Sized> BalanceReader<C> {
    pub fn new(chain: Arc<C>, deriver: AddressDeriver) -> Self {
        Self { chain, deriver }
    }

    pub async fn read_native(&self, wallet: &Pubkey) -> Result<u64, ChainError> {
        self.chain.get_balance(wallet).await
    }

    /// A missing token account is an expected state and reads as `Absent`.
    pub async fn read_token(
        &self,
        wallet: &Pubkey,
        asset: &Asset,
    ) -> Result<TokenBalance, ChainError> {
        let token_account = self.deriver.user_token_account(wallet, asset);
        match self.chain.get_token_account_balance(&token_account).await {
            Ok(Some(balance)) => Ok(TokenBalance::Present {
                amount: balance.amount,
            }),
            Ok(None) | Err(ChainError::AccountNotFound(_)) => {
                trace!("no {} token account {} for {}", asset.symbol, token_account, wallet);
                Ok(TokenBalance::Absent)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn read_all(
        &self,
        wallet: &Pubkey,
        registry: &AssetRegistry,
    ) -> Result<Balances, ChainError> {
        let assets: Vec<&Asset> = registry.iter().collect();
        let (native, tokens) = futures::join!(
            self.read_native(wallet),
            join_all(assets.iter().map(|asset| self.read_token(wallet, asset)))
        );

        let mut balances = Balances {
            native: native?,
            tokens: BTreeMap::new(),
        };
        for (asset, balance) in assets.into_iter().zip(tokens) {
            balances.tokens.insert(asset.mint, balance?);
        }
        debug!(
            "read balances for {}: {} lamports, {} token accounts",
            wallet,
            balances.native,
            balances.tokens.values().filter(|b| !b.is_absent()).count()
        );
        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::TokenAmount;
    use async_trait::async_trait;
    use solana_program::hash::Hash;
    use solana_sdk::{
        commitment_config::CommitmentConfig, signature::Signature, transaction::TransactionError,
    };
    use std::collections::HashMap;

    // Token accounts present in `tokens`; `broken` ones fail with an RPC error
    #[derive(Default)]
    struct StaticChain {
        lamports: HashMap<Pubkey, u64>,
        tokens: HashMap<Pubkey, u64>,
        not_found_errors: bool,
        broken: Option<Pubkey>,
    }

    #[async_trait]
    impl ChainReader for StaticChain {
        async fn get_balance(&self, address: &Pubkey) -> Result<u64, ChainError> {
            Ok(self.lamports.get(address).copied().unwrap_or(0))
        }

        async fn get_token_account_balance(
            &self,
            address: &Pubkey,
        ) -> Result<Option<TokenAmount>, ChainError> {
            if self.broken == Some(*address) {
                return Err(ChainError::Rpc("connection reset".into()));
            }
            match self.tokens.get(address) {
                Some(amount) => Ok(Some(TokenAmount {
                    amount: *amount,
                    decimals: 6,
                })),
                None if self.not_found_errors => Err(ChainError::AccountNotFound(*address)),
                None => Ok(None),
            }
        }

        async fn account_exists(&self, address: &Pubkey) -> Result<bool, ChainError> {
            Ok(self.tokens.contains_key(address))
        }

        async fn get_latest_blockhash(&self) -> Result<Hash, ChainError> {
            Ok(Hash::default())
        }

        async fn get_signature_status(
            &self,
            _signature: &Signature,
            _commitment: CommitmentConfig,
        ) -> Result<Option<Result<(), TransactionError>>, ChainError> {
            Ok(None)
        }
    }

    fn asset() -> Asset {
        Asset {
            symbol: "USDC".into(),
            mint: Pubkey::new_unique(),
            decimals: 6,
            token_program: spl_token::ID,
        }
    }

    #[tokio::test]
    async fn test_missing_token_account_is_absent() {
        let deriver = AddressDeriver::new(Pubkey::new_unique());
        let wallet = Pubkey::new_unique();
        let asset = asset();

        for not_found_errors in [false, true] {
            let chain = StaticChain {
                not_found_errors,
                ..Default::default()
            };
            let reader = BalanceReader::new(Arc::new(chain), deriver);
            let balance = reader.read_token(&wallet, &asset).await.unwrap();
            assert_eq!(balance, TokenBalance::Absent);
            assert_eq!(balance.amount(), 0);
        }
    }

    #[tokio::test]
    async fn test_reads_native_and_tokens() {
        let deriver = AddressDeriver::new(Pubkey::new_unique());
        let wallet = Pubkey::new_unique();
        let usdc = asset();
        let sol = Asset {
            symbol: "SOL".into(),
            decimals: 9,
            ..asset()
        };

        let mut chain = StaticChain::default();
        chain.lamports.insert(wallet, 5_000);
        chain
            .tokens
            .insert(deriver.user_token_account(&wallet, &usdc), 250);
        let reader = BalanceReader::new(Arc::new(chain), deriver);

        let registry = AssetRegistry::new(vec![usdc.clone(), sol.clone()], Some(usdc.mint));
        let balances = reader.read_all(&wallet, &registry).await.unwrap();
        assert_eq!(balances.native, 5_000);
        assert_eq!(balances.token(&usdc.mint), TokenBalance::Present { amount: 250 });
        assert_eq!(balances.token(&sol.mint), TokenBalance::Absent);
        assert_eq!(balances.token(&Pubkey::new_unique()), TokenBalance::Absent);
    }

    #[tokio::test]
    async fn test_rpc_failure_propagates() {
        let deriver = AddressDeriver::new(Pubkey::new_unique());
        let wallet = Pubkey::new_unique();
        let usdc = asset();
        let chain = StaticChain {
            broken: Some(deriver.user_token_account(&wallet, &usdc)),
            ..Default::default()
        };
        let reader = BalanceReader::new(Arc::new(chain), deriver);
        assert!(matches!(
            reader.read_token(&wallet, &usdc).await,
            Err(ChainError::Rpc(_))
        ));
    }
}
