//! Market-data source contract and its request/error types.
//!
//! A [`DataSource`] answers one question: "give me the recent bars for this
//! symbol". Adapters translate provider payloads into [`BarSeries`] and
//! classify every failure as a [`SourceError`]; nothing here retries.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::http_client::HttpError;
use crate::{BarSeries, Interval, Lookback, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    Unauthorized,
    InvalidRequest,
    Malformed,
}

/// Structured provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unauthorized, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Malformed, message)
    }

    /// Classify a non-2xx provider status.
    pub fn from_status(provider: &str, status: u16) -> Self {
        let message = format!("{provider} returned status {status}");
        match status {
            429 => Self::rate_limited(message),
            401 | 403 => Self::unauthorized(message),
            400 | 404 => Self::invalid_request(message),
            _ => Self::unavailable(message),
        }
    }

    pub fn transport(provider: &str, error: &HttpError) -> Self {
        Self::unavailable(format!("{provider} transport error: {}", error.message()))
    }

    /// Append provider-supplied detail, keeping the classification.
    pub fn with_detail(mut self, detail: impl AsRef<str>) -> Self {
        self.message.push_str(": ");
        self.message.push_str(detail.as_ref());
        self
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Unauthorized => "source.unauthorized",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Malformed => "source.malformed",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for the bars endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarsRequest {
    pub symbol: Symbol,
    pub interval: Interval,
    pub lookback: Lookback,
}

impl BarsRequest {
    pub fn new(symbol: Symbol, interval: Interval, lookback: Lookback) -> Self {
        Self {
            symbol,
            interval,
            lookback,
        }
    }
}

/// Provider adapter contract.
///
/// Implementations must be `Send + Sync`; a single instance is shared by
/// every invocation served by the process.
pub trait DataSource: Send + Sync {
    /// Short provider name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Fetch the bars covering `req.lookback`, oldest first.
    ///
    /// An empty series is a valid answer (market closed, fresh listing);
    /// callers decide whether that is an error.
    fn bars<'a>(
        &'a self,
        req: BarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>>;
}
