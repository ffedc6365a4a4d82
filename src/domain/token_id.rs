//! Token identifier.

use core::fmt;
use core::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::RouterError;

/// Opaque identifier of a token: its 20-byte contract address.
///
/// Parsing accepts hex with or without the `0x` prefix and ignores case, so
/// identifiers from different snapshot sources compare equal.
///
/// # Examples
///
/// ```
/// use smart_order_router::domain::TokenId;
///
/// let a: TokenId = "0x6b175474e89094c44da98b954eedeac495271d0f".parse().expect("hex");
/// let b: TokenId = "0x6B175474E89094C44DA98B954EEDEAC495271D0F".parse().expect("hex");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(Address);

impl TokenId {
    /// Creates an identifier from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(Address::new(bytes))
    }

    /// Returns the underlying address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for TokenId {
    fn from(value: Address) -> Self {
        Self(value)
    }
}

impl FromStr for TokenId {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_str(s.trim())
            .map(Self)
            .map_err(|_| RouterError::Parse(format!("invalid token address `{s}`")))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_round_trip() {
        let id = TokenId::from_bytes([7u8; 20]);
        assert_eq!(id.address(), Address::new([7u8; 20]));
    }

    #[test]
    fn parse_without_prefix() {
        let Ok(a) = "0000000000000000000000000000000000000001".parse::<TokenId>() else {
            panic!("expected Ok");
        };
        let mut bytes = [0u8; 20];
        bytes[19] = 1;
        assert_eq!(a, TokenId::from_bytes(bytes));
    }

    #[test]
    fn parse_rejects_short_hex() {
        assert!(matches!("0x1234".parse::<TokenId>(), Err(RouterError::Parse(_))));
    }

    #[test]
    fn display_is_lower_hex() {
        let id = TokenId::from_bytes([0xabu8; 20]);
        assert_eq!(id.to_string(), format!("0x{}", "ab".repeat(20)));
    }

    #[test]
    fn ordering_is_bytewise() {
        assert!(TokenId::from_bytes([1u8; 20]) < TokenId::from_bytes([2u8; 20]));
    }
}
