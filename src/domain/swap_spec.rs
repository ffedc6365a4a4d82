//! Swap operation specification.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Amount;
use crate::error::{Result, RouterError};

/// Which side of a trade is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapType {
    /// The input amount is fixed; output is computed.
    #[serde(rename = "swapExactIn")]
    ExactIn,
    /// The output amount is fixed; input is computed.
    #[serde(rename = "swapExactOut")]
    ExactOut,
}

impl fmt::Display for SwapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactIn => write!(f, "ExactIn"),
            Self::ExactOut => write!(f, "ExactOut"),
        }
    }
}

/// Specifies what constraint drives a swap: either an exact input amount
/// or an exact output amount.
///
/// # Invariants
///
/// The contained amount is always non-zero.
///
/// # Examples
///
/// ```
/// use smart_order_router::domain::{Amount, SwapSpec};
///
/// let spec = SwapSpec::exact_in(Amount::from_u128(1000));
/// assert!(spec.is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapSpec {
    /// The caller provides an exact input amount.
    ExactIn {
        /// The fixed input amount (always non-zero).
        amount_in: Amount,
    },
    /// The caller requests an exact output amount.
    ExactOut {
        /// The desired output amount (always non-zero).
        amount_out: Amount,
    },
}

impl SwapSpec {
    /// Creates an exact-input swap specification.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidInput`] if `amount` is zero.
    pub fn exact_in(amount: Amount) -> Result<Self> {
        if amount.is_zero() {
            return Err(RouterError::InvalidInput("swap amount must be non-zero"));
        }
        Ok(Self::ExactIn { amount_in: amount })
    }

    /// Creates an exact-output swap specification.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidInput`] if `amount` is zero.
    pub fn exact_out(amount: Amount) -> Result<Self> {
        if amount.is_zero() {
            return Err(RouterError::InvalidInput("swap amount must be non-zero"));
        }
        Ok(Self::ExactOut { amount_out: amount })
    }

    /// Builds a specification from a [`SwapType`] and amount.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidInput`] if `amount` is zero.
    pub fn new(swap_type: SwapType, amount: Amount) -> Result<Self> {
        match swap_type {
            SwapType::ExactIn => Self::exact_in(amount),
            SwapType::ExactOut => Self::exact_out(amount),
        }
    }

    /// Returns `true` if this is an exact-input specification.
    #[must_use]
    pub const fn is_exact_in(&self) -> bool {
        matches!(self, Self::ExactIn { .. })
    }

    /// Returns `true` if this is an exact-output specification.
    #[must_use]
    pub const fn is_exact_out(&self) -> bool {
        matches!(self, Self::ExactOut { .. })
    }

    /// Extracts the amount regardless of variant.
    pub const fn amount(&self) -> Amount {
        match self {
            Self::ExactIn { amount_in } => *amount_in,
            Self::ExactOut { amount_out } => *amount_out,
        }
    }

    /// Returns the [`SwapType`] descriptor for this specification.
    #[must_use]
    pub const fn swap_type(&self) -> SwapType {
        match self {
            Self::ExactIn { .. } => SwapType::ExactIn,
            Self::ExactOut { .. } => SwapType::ExactOut,
        }
    }
}

impl fmt::Display for SwapSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactIn { amount_in } => write!(f, "ExactIn({amount_in})"),
            Self::ExactOut { amount_out } => write!(f, "ExactOut({amount_out})"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // -- Construction -------------------------------------------------------

    #[test]
    fn exact_in_valid() {
        let Ok(spec) = SwapSpec::exact_in(Amount::from_u128(100)) else {
            panic!("expected Ok");
        };
        assert!(spec.is_exact_in());
        assert!(!spec.is_exact_out());
        assert_eq!(spec.amount(), Amount::from_u128(100));
        assert_eq!(spec.swap_type(), SwapType::ExactIn);
    }

    #[test]
    fn exact_out_valid() {
        let Ok(spec) = SwapSpec::new(SwapType::ExactOut, Amount::from_u128(200)) else {
            panic!("expected Ok");
        };
        assert!(spec.is_exact_out());
        assert_eq!(spec.amount(), Amount::from_u128(200));
    }

    #[test]
    fn zero_rejected() {
        assert_eq!(
            SwapSpec::exact_in(Amount::ZERO),
            Err(RouterError::InvalidInput("swap amount must be non-zero"))
        );
        assert!(SwapSpec::exact_out(Amount::ZERO).is_err());
    }

    // -- Display & serde ----------------------------------------------------

    #[test]
    fn display() {
        let Ok(spec) = SwapSpec::exact_in(Amount::from_u128(42)) else {
            panic!("expected Ok");
        };
        assert_eq!(spec.to_string(), "ExactIn(42)");
        assert_eq!(SwapType::ExactOut.to_string(), "ExactOut");
    }

    #[test]
    fn swap_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&SwapType::ExactIn).ok(),
            Some("\"swapExactIn\"".to_owned())
        );
        let Ok(t) = serde_json::from_str::<SwapType>("\"swapExactOut\"") else {
            panic!("deserialize");
        };
        assert_eq!(t, SwapType::ExactOut);
    }
}
