//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker, also the stream partition key |
//! | [`Interval`] | Bar granularity (1m … 1d) |
//! | [`Lookback`] | History window of a bars request |
//! | [`IntervalStart`] | Interval start in provider-local time |
//! | [`IntervalBar`] | OHLCV sample |
//! | [`BarSeries`] | Ordered bars for one symbol |
//! | [`QuoteRecord`] | Stock record published to the stream |
//! | [`CryptoRecord`] | Crypto record published to the stream |

mod bar;
mod interval;
mod record;
mod symbol;

pub use bar::{BarSeries, IntervalBar, IntervalStart};
pub use interval::{Interval, Lookback};
pub use record::{CryptoRecord, QuoteRecord};
pub use symbol::Symbol;
