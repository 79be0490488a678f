use solana_program::pubkey::Pubkey;

use crate::error::ValidationError;

/// Largest decimal precision whose scale factor still fits in a `u64`.
pub const MAX_DECIMALS: u8 = 19;

/// A fungible token known to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub symbol: String,
    pub mint: Pubkey,
    pub decimals: u8,
    pub token_program: Pubkey,
}

impl Asset {
    pub fn to_base_units(&self, amount: &str) -> Result<u64, ValidationError> {
        to_base_units(amount, self.decimals)
    }

    pub fn to_human_units(&self, base_units: u64) -> String {
        to_human_units(base_units, self.decimals)
    }
}

/// Fixed table of assets the protocol has banks for.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    assets: Vec<Asset>,
    reference: Option<Pubkey>,
}

impl AssetRegistry {
    pub fn new(assets: Vec<Asset>, reference: Option<Pubkey>) -> Self {
        Self { assets, reference }
    }

    pub fn get(&self, mint: &Pubkey) -> Result<&Asset, ValidationError> {
        self.assets
            .iter()
            .find(|asset| asset.mint == *mint)
            .ok_or(ValidationError::UnknownAsset(*mint))
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Asset> {
        self.assets
            .iter()
            .find(|asset| asset.symbol.eq_ignore_ascii_case(symbol))
    }

    /// The stablecoin user positions are denominated in.
    pub fn reference(&self) -> Option<&Asset> {
        self.reference.and_then(|mint| self.get(&mint).ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }
}

/// Converts a human readable decimal amount into base units,
/// rounding half up when more fractional digits are given than `decimals`.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<u64, ValidationError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyAmount);
    }
    if trimmed.starts_with('-') {
        return Err(ValidationError::NegativeAmount(trimmed.to_owned()));
    }
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(ValidationError::InvalidAmount(trimmed.to_owned()));
    }

    let overflow = || ValidationError::AmountOverflow {
        amount: trimmed.to_owned(),
        decimals,
    };
    let scale = 10u64.checked_pow(decimals as u32).ok_or_else(overflow)?;

    let mut base = whole
        .bytes()
        .try_fold(0u64, |acc, b| {
            acc.checked_mul(10)?.checked_add((b - b'0') as u64)
        })
        .and_then(|w| w.checked_mul(scale))
        .ok_or_else(overflow)?;

    let precision = decimals as usize;
    let mut fraction_units = 0u64;
    for (i, b) in fraction.bytes().take(precision).enumerate() {
        let place = 10u64.pow((precision - i - 1) as u32);
        fraction_units += (b - b'0') as u64 * place;
    }
    // round half up on the first dropped digit
    if fraction.len() > precision && fraction.as_bytes()[precision] >= b'5' {
        fraction_units += 1;
    }
    base = base.checked_add(fraction_units).ok_or_else(overflow)?;

    Ok(base)
}

pub fn to_human_units(base_units: u64, decimals: u8) -> String {
    if decimals == 0 {
        return base_units.to_string();
    }
    let precision = decimals as usize;
    let padded = format!("{:0>width$}", base_units, width = precision + 1);
    let (whole, fraction) = padded.split_at(padded.len() - precision);
    format!("{whole}.{fraction}")
}
