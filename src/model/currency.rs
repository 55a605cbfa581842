use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Maximum number of ASCII characters a currency code may carry.
pub const MAX_CURRENCY_CODE_LEN: usize = 10;

/// A compact, fixed-width currency identifier. Two codes are equal iff their uppercase ASCII
/// representations are equal; `CurrencyCode::neutral()` is the special value used to mean
/// "no currency" (e.g. after stripping the unit via `MonetaryAmount::to_neutral`).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct CurrencyCode {
    len: u8,
    bytes: [u8; MAX_CURRENCY_CODE_LEN],
}

impl CurrencyCode {
    pub fn new(code: &str) -> Self {
        let upper = code.to_ascii_uppercase();
        let bytes_in = upper.as_bytes();
        assert!(
            bytes_in.len() <= MAX_CURRENCY_CODE_LEN,
            "currency code '{code}' exceeds {MAX_CURRENCY_CODE_LEN} characters"
        );
        let mut bytes = [0u8; MAX_CURRENCY_CODE_LEN];
        bytes[..bytes_in.len()].copy_from_slice(bytes_in);
        Self {
            len: bytes_in.len() as u8,
            bytes,
        }
    }

    /// The special "no currency" value, produced by stripping a unit from a `MonetaryAmount`.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn is_neutral(&self) -> bool {
        self.len == 0
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CurrencyCode {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_equality_is_case_insensitive() {
        assert_eq!(CurrencyCode::new("btc"), CurrencyCode::new("BTC"));
    }

    #[test]
    fn test_neutral() {
        assert!(CurrencyCode::neutral().is_neutral());
        assert!(!CurrencyCode::new("EUR").is_neutral());
    }

    #[test]
    fn test_display_round_trip() {
        let c = CurrencyCode::new("USDT");
        assert_eq!(c.to_string(), "USDT");
    }
}
