use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::ETHER_DECIMALS;
use crate::error::{SaleError, SaleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    pub raw: U256,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Wei amount in the native currency.
    pub fn wei(raw: U256) -> Self {
        Self::new(raw, ETHER_DECIMALS)
    }

    /// Converts a human amount (e.g. `1.5` ether) into raw units.
    ///
    /// Rejects negative values and values with more fractional digits than
    /// `decimals` can hold, so no precision is dropped silently.
    pub fn from_decimal(d: Decimal, decimals: u8) -> SaleResult<Self> {
        if d.is_sign_negative() && !d.is_zero() {
            return Err(SaleError::invalid(format!("negative amount {d}")));
        }

        let d = d.normalize();
        let scale = d.scale();
        if scale > u32::from(decimals) {
            return Err(SaleError::invalid(format!(
                "amount {d} has more than {decimals} decimals"
            )));
        }

        let mantissa = u128::try_from(d.mantissa())
            .map_err(|_| SaleError::invalid(format!("amount {d} out of range")))?;
        let multiplier = U256::exp10((u32::from(decimals) - scale) as usize);
        let raw = U256::from(mantissa)
            .checked_mul(multiplier)
            .ok_or_else(|| SaleError::invalid(format!("amount {d} out of range")))?;

        Ok(Self { raw, decimals })
    }

    /// Decimal view of the amount, `None` when it exceeds `Decimal`'s 96-bit mantissa.
    pub fn to_decimal(&self) -> Option<Decimal> {
        if self.raw > U256::from(u128::MAX) {
            return None;
        }
        let raw = i128::try_from(self.raw.as_u128()).ok()?;
        Decimal::try_from_i128_with_scale(raw, u32::from(self.decimals))
            .ok()
            .map(|d| d.normalize())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = U256::exp10(self.decimals as usize);
        let whole = self.raw / unit;
        let frac = self.raw % unit;

        if frac.is_zero() {
            return write!(f, "{whole}");
        }

        let frac = format!("{:0>width$}", frac.to_string(), width = self.decimals as usize);
        write!(f, "{whole}.{}", frac.trim_end_matches('0'))
    }
}
