use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifies one configured account among possibly several on the same exchange, e.g. two API
/// keys both trading on "binance" distinguished by `key_name`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ExchangeName {
    exchange: String,
    key_name: String,
}

impl ExchangeName {
    pub fn new(exchange: impl Into<String>, key_name: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            key_name: key_name.into(),
        }
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }
}

impl Display for ExchangeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.exchange, self.key_name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ExchangeName::new("binance", "main").to_string(), "binance_main");
    }
}
