//! # Tickpipe Core
//!
//! Fetch the latest market bar, turn it into a flat record, push it onto a
//! stream.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo Finance chart, CoinMarketCap listings) |
//! | [`config`] | Environment-driven publisher settings |
//! | [`crypto_publisher`] | CoinMarketCap → stream publisher |
//! | [`data_source`] | Bars source trait and provider error types |
//! | [`domain`] | Symbol, interval, bar and record types |
//! | [`error`] | Validation, configuration and publish errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`publisher`] | Stock quote → stream publisher |
//! | [`response`] | `{statusCode, body}` invocation response |
//! | [`sink`] | Record sink trait and in-memory sink |
//!
//! ## Flow
//!
//! ```text
//! trigger ──▶ QuotePublisher::handle
//!                 │
//!                 ├─▶ DataSource::bars        (YahooAdapter ─▶ HttpClient)
//!                 ├─▶ BarSeries::latest       (empty ⇒ PublishError::EmptySeries)
//!                 ├─▶ QuoteRecord::from_bar
//!                 └─▶ RecordSink::put_record  (partition key = symbol)
//! ```
//!
//! Nothing is retried. A failed step ends the invocation with its error.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickpipe_core::{MemorySink, QuotePublisher, QuotePublisherConfig, ReqwestHttpClient, YahooAdapter};
//!
//! let config = QuotePublisherConfig::from_env()?;
//! let source = Arc::new(YahooAdapter::new(Arc::new(ReqwestHttpClient::try_new()?)));
//! let publisher = QuotePublisher::new(config, source, Arc::new(MemorySink::new()));
//! let response = publisher.handle().await?;
//! assert_eq!(response.status_code, 200);
//! ```

pub mod adapters;
pub mod config;
pub mod crypto_publisher;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod publisher;
pub mod response;
pub mod sink;

pub use adapters::{CoinMarketCapAdapter, CryptoListing, YahooAdapter};

pub use config::{CryptoPublisherConfig, QuotePublisherConfig};

pub use crypto_publisher::{CryptoOutcome, CryptoPublisher};

pub use data_source::{BarsRequest, DataSource, SourceError, SourceErrorKind};

pub use domain::{
    BarSeries, CryptoRecord, Interval, IntervalBar, IntervalStart, Lookback, QuoteRecord, Symbol,
};

pub use error::{ConfigError, PublishError, ValidationError};

pub use http_client::{
    CannedHttpClient, HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

pub use publisher::{PublishedQuote, QuotePublisher};

pub use response::InvocationResponse;

pub use sink::{MemorySink, PutReceipt, PutRecord, RecordSink, SinkError, SinkErrorKind};
