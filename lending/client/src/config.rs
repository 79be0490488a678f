use std::{collections::HashSet, str::FromStr, time::Duration};

use log::info;
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;

use crate::{
    error::{ConfigError, ValidationError},
    state::{Asset, AssetRegistry, MAX_DECIMALS},
};

// Lending program deployment used when no program id is configured
pub const DEFAULT_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("9XCHC5dVRNSkZvmMNj9F9ZQXPfXYjD6BQH2trTtkqBs5");
pub const USDC_MINT: Pubkey =
    Pubkey::from_str_const("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
pub const WSOL_MINT: Pubkey =
    Pubkey::from_str_const("So11111111111111111111111111111111111111112");

pub const USDC_DECIMALS: u8 = 6;
pub const SOL_DECIMALS: u8 = 9;

// Percentages passed to initialize_bank
pub const MAX_PERCENT: u64 = 100;
pub const DEFAULT_LIQUIDATION_THRESHOLD: u64 = 80;
pub const DEFAULT_MAX_LTV: u64 = 70;

pub const DEFAULT_CONFIRM_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Serializes public keys as base58 strings.
mod pubkey_string {
    use super::*;
    use serde::{Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(D::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            key: &Option<Pubkey>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match key {
                Some(key) => serializer.serialize_some(&key.to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Pubkey>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|s| Pubkey::from_str(&s).map_err(D::Error::custom))
                .transpose()
        }
    }
}

// Functions Helpers
fn default_program_id() -> Pubkey {
    DEFAULT_PROGRAM_ID
}

fn default_token_program() -> Pubkey {
    spl_token::ID
}

fn default_assets() -> Vec<AssetConfig> {
    vec![
        AssetConfig {
            symbol: "USDC".to_owned(),
            mint: USDC_MINT,
            decimals: USDC_DECIMALS,
            token_program: default_token_program(),
        },
        AssetConfig {
            symbol: "SOL".to_owned(),
            mint: WSOL_MINT,
            decimals: SOL_DECIMALS,
            token_program: default_token_program(),
        },
    ]
}

fn default_reference_asset() -> String {
    String::from("USDC")
}

fn default_confirm_timeout_ms() -> u64 {
    DEFAULT_CONFIRM_TIMEOUT_MS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub symbol: String,
    #[serde(with = "pubkey_string")]
    pub mint: Pubkey,
    pub decimals: u8,
    #[serde(with = "pubkey_string", default = "default_token_program")]
    pub token_program: Pubkey,
}

impl From<&AssetConfig> for Asset {
    fn from(config: &AssetConfig) -> Self {
        Asset {
            symbol: config.symbol.clone(),
            mint: config.mint,
            decimals: config.decimals,
            token_program: config.token_program,
        }
    }
}

/// Risk parameters a bank is created with, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskParameters {
    pub liquidation_threshold: u64,
    pub max_ltv: u64,
}

impl RiskParameters {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("liquidation_threshold", self.liquidation_threshold),
            ("max_ltv", self.max_ltv),
        ] {
            if value > MAX_PERCENT {
                return Err(ValidationError::InvalidRiskParameter { name, value });
            }
        }
        Ok(())
    }
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            liquidation_threshold: DEFAULT_LIQUIDATION_THRESHOLD,
            max_ltv: DEFAULT_MAX_LTV,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl From<Commitment> for CommitmentConfig {
    fn from(commitment: Commitment) -> Self {
        match commitment {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Lending program id all PDAs are derived under
    #[serde(with = "pubkey_string", default = "default_program_id")]
    pub program_id: Pubkey,
    /// Assets with a bank, and their decimal precision
    #[serde(default = "default_assets")]
    pub assets: Vec<AssetConfig>,
    /// Symbol of the stablecoin recorded by initialize_user
    #[serde(default = "default_reference_asset")]
    pub reference_asset: String,
    /// Parameters used by initialize_bank when none are given
    #[serde(default)]
    pub risk: RiskParameters,
    /// Pyth price update account required by borrow and liquidate
    #[serde(with = "pubkey_string::option", default)]
    pub price_update: Option<Pubkey>,
    #[serde(default)]
    pub commitment: Commitment,
    #[serde(default = "default_confirm_timeout_ms")]
    pub confirm_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            program_id: default_program_id(),
            assets: default_assets(),
            reference_asset: default_reference_asset(),
            risk: RiskParameters::default(),
            price_update: None,
            commitment: Commitment::default(),
            confirm_timeout_ms: default_confirm_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = serde_json::from_str(json)?;
        config.validate()?;
        info!(
            "Loaded lending client config for program {} with {} assets",
            config.program_id,
            config.assets.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for asset in &self.assets {
            if !seen.insert(asset.mint) {
                return Err(ConfigError::DuplicateAsset(asset.mint));
            }
            if asset.decimals > MAX_DECIMALS {
                return Err(ConfigError::UnsupportedDecimals {
                    symbol: asset.symbol.clone(),
                    decimals: asset.decimals,
                    max: MAX_DECIMALS,
                });
            }
        }

        if !self
            .assets
            .iter()
            .any(|asset| asset.symbol.eq_ignore_ascii_case(&self.reference_asset))
        {
            return Err(ConfigError::UnknownReferenceAsset(self.reference_asset.clone()));
        }

        self.risk.validate().map_err(ConfigError::InvalidRisk)
    }

    pub fn registry(&self) -> AssetRegistry {
        let assets: Vec<Asset> = self.assets.iter().map(Asset::from).collect();
        let reference = assets
            .iter()
            .find(|asset| asset.symbol.eq_ignore_ascii_case(&self.reference_asset))
            .map(|asset| asset.mint);
        AssetRegistry::new(assets, reference)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
