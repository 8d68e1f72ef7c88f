//! Human tez amounts and their conversion to mutez.
//!
//! An amount is kept as an exact decimal with 12 fractional digits of tez,
//! which is 6 fractional digits of mutez. Converting to mutez truncates to
//! that precision and then rounds up to a whole mutez.

use std::fmt;
use std::str::FromStr;

use crate::blockchain::types::BlockchainError;

/// Fractional digits of tez kept after parsing.
const SCALE_DIGITS: usize = 12;
const UNITS_PER_MUTEZ: u128 = 1_000_000;

/// Non-negative tez amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tez {
    /// Value in 10^-12 tez.
    units: u128,
}

impl Tez {
    pub const ZERO: Tez = Tez { units: 0 };

    pub fn from_mutez(mutez: u64) -> Self {
        Self {
            units: u128::from(mutez) * UNITS_PER_MUTEZ,
        }
    }

    /// Mutez value, sub-mutez remainder rounded up.
    pub fn to_mutez(&self) -> Result<u64, BlockchainError> {
        let whole = self.units.div_ceil(UNITS_PER_MUTEZ);
        u64::try_from(whole)
            .map_err(|_| BlockchainError::Configuration(format!("amount {self} overflows mutez")))
    }

    pub fn is_zero(&self) -> bool {
        self.units == 0
    }
}

impl FromStr for Tez {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BlockchainError::Configuration(format!("invalid tez amount '{s}'"));
        let s = s.trim();
        if s.starts_with('-') {
            return Err(BlockchainError::Configuration(format!("negative tez amount '{s}'")));
        }
        let s = s.strip_prefix('+').unwrap_or(s);

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }

        let int_units = if int_part.is_empty() {
            0
        } else {
            int_part.parse::<u128>().map_err(|_| invalid())?
        };

        // Digits beyond the kept precision are dropped.
        let mut frac = frac_part.chars().take(SCALE_DIGITS).collect::<String>();
        while frac.len() < SCALE_DIGITS {
            frac.push('0');
        }
        let frac_units = frac.parse::<u128>().map_err(|_| invalid())?;

        let scale = 10u128.pow(SCALE_DIGITS as u32);
        let units = int_units
            .checked_mul(scale)
            .and_then(|v| v.checked_add(frac_units))
            .ok_or_else(invalid)?;
        Ok(Self { units })
    }
}

impl fmt::Display for Tez {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = 10u128.pow(SCALE_DIGITS as u32);
        let int = self.units / scale;
        let frac = self.units % scale;
        if frac == 0 {
            return write!(f, "{int}");
        }
        let digits = format!("{frac:0width$}", width = SCALE_DIGITS);
        write!(f, "{int}.{}", digits.trim_end_matches('0'))
    }
}

impl TryFrom<&str> for Tez {
    type Error = BlockchainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
