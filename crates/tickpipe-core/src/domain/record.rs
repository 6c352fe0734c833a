use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{IntervalBar, IntervalStart, Symbol};

/// Flat stock quote written to the stream, one per invocation.
///
/// Field order and wire names are what downstream consumers parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "name")]
    pub symbol: Symbol,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    #[serde(rename = "datetime")]
    pub timestamp: IntervalStart,
}

impl QuoteRecord {
    pub fn from_bar(user_id: Uuid, symbol: Symbol, bar: &IntervalBar) -> Self {
        Self {
            user_id,
            symbol,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            timestamp: bar.start,
        }
    }
}

/// Crypto snapshot written to the stream by the CoinMarketCap publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoRecord {
    pub user_id: Uuid,
    /// Ticker of the coin, e.g. `BTC`.
    pub name: String,
    pub price: f64,
    #[serde(rename = "variation24h")]
    pub variation_24h: f64,
    pub market_cap: f64,
}
