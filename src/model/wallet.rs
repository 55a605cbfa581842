use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::account_owner::AccountOwner;
use crate::model::currency::CurrencyCode;
use crate::model::exchange_name::ExchangeName;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
struct TrustedAddressEntry {
    address: String,
    tag: Option<String>,
}

/// The trusted deposit-address allow-list, keyed by (exchange, key name, currency). Loaded once
/// at startup from a JSON file; a `Wallet` is rejected at construction unless its address
/// matches the entry for its key.
#[derive(Clone, Debug, Default)]
pub struct TrustedAddresses {
    entries: HashMap<(ExchangeName, CurrencyCode), TrustedAddressEntry>,
}

impl TrustedAddresses {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::WalletValidationFailed {
                exchange: "*".into(),
                key_name: "*".into(),
                currency: format!("could not read trusted address file: {e}"),
            })?;
        Self::from_json(&raw)
    }

    fn from_json(raw: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct FileEntry {
            exchange: String,
            key_name: String,
            currency: String,
            address: String,
            tag: Option<String>,
        }
        let parsed: Vec<FileEntry> = serde_json::from_str(raw)
            .map_err(|e| Error::WalletValidationFailed {
                exchange: "*".into(),
                key_name: "*".into(),
                currency: format!("malformed trusted address file: {e}"),
            })?;
        let mut entries = HashMap::new();
        for e in parsed {
            entries.insert(
                (ExchangeName::new(e.exchange, e.key_name), CurrencyCode::new(&e.currency)),
                TrustedAddressEntry { address: e.address, tag: e.tag },
            );
        }
        Ok(Self { entries })
    }

    pub fn is_trusted(&self, exchange_name: &ExchangeName, currency: CurrencyCode, address: &str, tag: Option<&str>) -> bool {
        match self.entries.get(&(exchange_name.clone(), currency)) {
            Some(entry) => entry.address == address && entry.tag.as_deref() == tag,
            None => false,
        }
    }
}

/// A validated withdrawal destination: an exchange account, the currency it accepts, and the
/// address (plus optional tag/memo) to send to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    exchange_name: ExchangeName,
    currency: CurrencyCode,
    address: String,
    tag: Option<String>,
    owner: AccountOwner,
}

impl Wallet {
    /// Validates against `trusted` unless the `skip-wallet-validation` feature is enabled, which
    /// is always the case for unit tests that never actually withdraw.
    pub fn new(
        exchange_name: ExchangeName,
        currency: CurrencyCode,
        address: impl Into<String>,
        tag: Option<String>,
        owner: AccountOwner,
        trusted: &TrustedAddresses,
    ) -> Result<Self> {
        let address = address.into();
        if !Self::validation_skipped() && !trusted.is_trusted(&exchange_name, currency, &address, tag.as_deref()) {
            return Err(Error::WalletValidationFailed {
                exchange: exchange_name.exchange().to_string(),
                key_name: exchange_name.key_name().to_string(),
                currency: currency.to_string(),
            });
        }
        Ok(Self {
            exchange_name,
            currency,
            address,
            tag,
            owner,
        })
    }

    #[cfg(any(feature = "skip-wallet-validation", test))]
    fn validation_skipped() -> bool {
        true
    }

    #[cfg(not(any(feature = "skip-wallet-validation", test)))]
    fn validation_skipped() -> bool {
        false
    }

    pub fn exchange_name(&self) -> &ExchangeName {
        &self.exchange_name
    }

    pub fn currency_code(&self) -> CurrencyCode {
        self.currency
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn destination_tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn has_destination_tag(&self) -> bool {
        self.tag.is_some()
    }

    pub fn owner(&self) -> &AccountOwner {
        &self.owner
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validation_skipped_under_cfg_test() {
        let trusted = TrustedAddresses::default();
        let w = Wallet::new(
            ExchangeName::new("binance", "main"),
            CurrencyCode::new("BTC"),
            "bc1qanything",
            None,
            AccountOwner::new("alice"),
            &trusted,
        );
        assert!(w.is_ok());
    }

    #[test]
    fn test_trusted_addresses_round_trip() {
        let raw = r#"[{"exchange":"binance","key_name":"main","currency":"BTC","address":"bc1qexpected","tag":null}]"#;
        let trusted = TrustedAddresses::from_json(raw).unwrap();
        assert!(trusted.is_trusted(&ExchangeName::new("binance", "main"), CurrencyCode::new("BTC"), "bc1qexpected", None));
        assert!(!trusted.is_trusted(&ExchangeName::new("binance", "main"), CurrencyCode::new("BTC"), "bc1qwrong", None));
    }
}
