use thiserror::Error;

use crate::data_source::SourceError;
use crate::domain::{Interval, Lookback, Symbol};
use crate::sink::SinkError;

/// Validation and contract errors exposed by `tickpipe-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter, digit or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid interval '{value}', expected one of 1m, 5m, 15m, 30m, 1h, 1d")]
    InvalidInterval { value: String },
    #[error("invalid lookback '{value}', expected one of 1d, 5d, 1mo")]
    InvalidLookback { value: String },

    #[error("invalid interval timestamp '{value}'")]
    InvalidTimestamp { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
}

/// Missing or malformed runtime configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable '{name}' is not set")]
    Missing { name: &'static str },
    #[error("environment variable '{name}' is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Everything that can abort a publish invocation.
///
/// No variant is recovered from locally; the hosting runtime sees the error
/// and marks the invocation as failed.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("provider returned no {interval} bars for {symbol} over the last {lookback}")]
    EmptySeries {
        symbol: Symbol,
        interval: Interval,
        lookback: Lookback,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
