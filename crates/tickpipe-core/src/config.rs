//! Environment-driven configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `KINESIS_STREAM_NAME` | required |
//! | `QUOTE_SYMBOL` | `AAPL` |
//! | `QUOTE_USER_ID` | `f1c20422-47b5-4207-9c9c-479a0286e6d6` |
//! | `QUOTE_INTERVAL` | `1h` |
//! | `QUOTE_LOOKBACK` | `1d` |
//! | `YAHOO_COOKIE` | unset |
//! | `COINMARKETCAP_API_KEY` | required by the crypto publisher |
//! | `CRYPTO_CURRENCY_NAME` | `Bitcoin` |

use std::str::FromStr;

use uuid::Uuid;

use crate::{ConfigError, Interval, Lookback, Symbol};

pub const STREAM_NAME_VAR: &str = "KINESIS_STREAM_NAME";
pub const SYMBOL_VAR: &str = "QUOTE_SYMBOL";
pub const USER_ID_VAR: &str = "QUOTE_USER_ID";
pub const INTERVAL_VAR: &str = "QUOTE_INTERVAL";
pub const LOOKBACK_VAR: &str = "QUOTE_LOOKBACK";
pub const YAHOO_COOKIE_VAR: &str = "YAHOO_COOKIE";
pub const CMC_API_KEY_VAR: &str = "COINMARKETCAP_API_KEY";
pub const CRYPTO_NAME_VAR: &str = "CRYPTO_CURRENCY_NAME";

pub const DEFAULT_SYMBOL: &str = "AAPL";
pub const DEFAULT_USER_ID: &str = "f1c20422-47b5-4207-9c9c-479a0286e6d6";
pub const DEFAULT_CRYPTO_NAME: &str = "Bitcoin";

/// Settings of the stock quote publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotePublisherConfig {
    pub stream_name: String,
    pub symbol: Symbol,
    pub user_id: Uuid,
    pub interval: Interval,
    pub lookback: Lookback,
    pub yahoo_cookie: Option<String>,
}

impl QuotePublisherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = non_empty(lookup);

        Ok(Self {
            stream_name: required(&lookup, STREAM_NAME_VAR)?,
            symbol: parsed(&lookup, SYMBOL_VAR, DEFAULT_SYMBOL)?,
            user_id: parsed(&lookup, USER_ID_VAR, DEFAULT_USER_ID)?,
            interval: parsed(&lookup, INTERVAL_VAR, Interval::OneHour.as_str())?,
            lookback: parsed(&lookup, LOOKBACK_VAR, Lookback::OneDay.as_str())?,
            yahoo_cookie: lookup(YAHOO_COOKIE_VAR),
        })
    }
}

/// Settings of the CoinMarketCap publisher.
#[derive(Clone, PartialEq, Eq)]
pub struct CryptoPublisherConfig {
    pub stream_name: String,
    pub user_id: Uuid,
    pub currency_name: String,
    pub api_key: String,
}

impl std::fmt::Debug for CryptoPublisherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoPublisherConfig")
            .field("stream_name", &self.stream_name)
            .field("user_id", &self.user_id)
            .field("currency_name", &self.currency_name)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl CryptoPublisherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = non_empty(lookup);

        Ok(Self {
            stream_name: required(&lookup, STREAM_NAME_VAR)?,
            user_id: parsed(&lookup, USER_ID_VAR, DEFAULT_USER_ID)?,
            currency_name: lookup(CRYPTO_NAME_VAR)
                .unwrap_or_else(|| String::from(DEFAULT_CRYPTO_NAME)),
            api_key: required(&lookup, CMC_API_KEY_VAR)?,
        })
    }
}

fn non_empty<F>(lookup: F) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    move |name| {
        lookup(name)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name).ok_or(ConfigError::Missing { name })
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(name).unwrap_or_else(|| default.to_owned());
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
