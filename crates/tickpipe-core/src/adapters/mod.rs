//! Provider adapters.

pub mod coinmarketcap;
pub mod yahoo;

pub use coinmarketcap::{CoinMarketCapAdapter, CryptoListing};
pub use yahoo::YahooAdapter;
