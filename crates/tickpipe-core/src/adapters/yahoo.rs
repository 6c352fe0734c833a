use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::UtcOffset;
use tokio::sync::Mutex;

use crate::data_source::{BarsRequest, DataSource, SourceError};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse};
use crate::{BarSeries, Interval, IntervalBar, IntervalStart, Symbol};

const PROVIDER: &str = "yahoo";
const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const COOKIE_ENDPOINT: &str = "https://fc.yahoo.com";
const CRUMB_ENDPOINTS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const REFERER: &str = "https://finance.yahoo.com/";

/// Yahoo Finance chart adapter.
///
/// Yahoo's unofficial API hands out a session cookie from `fc.yahoo.com` and
/// a crumb token that must accompany data requests. Both are negotiated on
/// the first call and kept for the life of the process; the cookie lives in
/// the transport's jar, the crumb here. A crumb the chart endpoint rejects
/// with 401/403 is dropped, so the next call negotiates a fresh one.
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    negotiate_session: bool,
    crumb: Mutex<Option<String>>,
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth: HttpAuth::None,
            negotiate_session: true,
            crumb: Mutex::new(None),
        }
    }

    /// Send a fixed session cookie (e.g. from `YAHOO_COOKIE`) on every request.
    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Skip the cookie/crumb handshake and call the chart endpoint bare.
    pub fn without_session(mut self) -> Self {
        self.negotiate_session = false;
        self
    }

    async fn crumb(&self) -> Result<Option<String>, SourceError> {
        if !self.negotiate_session {
            return Ok(None);
        }

        // Lock spans the handshake; waiters reuse its crumb.
        let mut slot = self.crumb.lock().await;
        if let Some(crumb) = slot.as_ref() {
            return Ok(Some(crumb.clone()));
        }

        let crumb = self.negotiate_crumb().await?;
        *slot = Some(crumb.clone());
        Ok(Some(crumb))
    }

    async fn discard_crumb(&self, rejected: &str) {
        let mut slot = self.crumb.lock().await;
        if slot.as_deref() == Some(rejected) {
            tracing::warn!("yahoo rejected the session crumb; renegotiating on next call");
            *slot = None;
        }
    }

    async fn negotiate_crumb(&self) -> Result<String, SourceError> {
        tracing::debug!("negotiating yahoo session crumb");

        // fc.yahoo.com answers 404 but still sets the session cookie.
        let cookie_request = HttpRequest::get(COOKIE_ENDPOINT)
            .with_header("referer", REFERER)
            .with_auth(&self.auth);
        self.http_client
            .execute(cookie_request)
            .await
            .map_err(|e| SourceError::transport(PROVIDER, &e))?;

        for endpoint in CRUMB_ENDPOINTS {
            let request = HttpRequest::get(endpoint)
                .with_header("referer", REFERER)
                .with_auth(&self.auth);

            let response = match self.http_client.execute(request).await {
                Ok(response) => response,
                Err(error) => {
                    tracing::debug!(endpoint, error = %error, "crumb endpoint unreachable");
                    continue;
                }
            };

            if response.status == 429 {
                return Err(SourceError::rate_limited(
                    "yahoo rate limited the crumb request",
                ));
            }

            if let Some(crumb) = accept_crumb(&response) {
                return Ok(crumb);
            }
        }

        Err(SourceError::unauthorized(
            "failed to obtain a yahoo crumb from any endpoint",
        ))
    }

    async fn fetch_chart(&self, req: &BarsRequest) -> Result<BarSeries, SourceError> {
        let mut endpoint = format!(
            "{CHART_ENDPOINT}/{}?range={}&interval={}&includePrePost=false",
            urlencoding::encode(req.symbol.as_str()),
            req.lookback.as_str(),
            req.interval.as_str(),
        );
        let crumb = self.crumb().await?;
        if let Some(crumb) = &crumb {
            endpoint.push_str("&crumb=");
            endpoint.push_str(&urlencoding::encode(crumb));
        }

        tracing::debug!(symbol = %req.symbol, interval = %req.interval, lookback = %req.lookback, "requesting yahoo chart");

        let request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_auth(&self.auth);
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::transport(PROVIDER, &e))?;

        if !response.is_success() {
            if let (401 | 403, Some(crumb)) = (response.status, &crumb) {
                self.discard_crumb(crumb).await;
            }
            return Err(status_error(&response));
        }

        parse_chart(&req.symbol, req.interval, &response.body)
    }
}

impl DataSource for YahooAdapter {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn bars<'a>(
        &'a self,
        req: BarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.fetch_chart(&req).await })
    }
}

fn accept_crumb(response: &HttpResponse) -> Option<String> {
    if !response.is_success() {
        return None;
    }

    let body = response.body.trim();
    let looks_like_html = body.contains("<html") || body.contains("<!DOCTYPE");
    let plausible = !body.is_empty() && body.len() < 100 && !body.contains(' ');
    if looks_like_html || !plausible {
        return None;
    }

    Some(body.to_owned())
}

fn status_error(response: &HttpResponse) -> SourceError {
    let error = SourceError::from_status(PROVIDER, response.status);
    match serde_json::from_str::<ChartEnvelope>(&response.body) {
        Ok(ChartEnvelope {
            chart: ChartBody {
                error: Some(detail),
                ..
            },
        }) => error.with_detail(format!("{} {}", detail.code, detail.description)),
        _ => error,
    }
}

/// Decode a v8 chart payload into bars in the exchange's local offset.
///
/// Rows missing any of open/high/low/close are dropped; a missing volume
/// counts as zero.
fn parse_chart(symbol: &Symbol, interval: Interval, body: &str) -> Result<BarSeries, SourceError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = envelope.chart.error {
        return Err(SourceError::invalid_request(format!(
            "yahoo chart error for {symbol}: {} {}",
            error.code, error.description
        )));
    }

    let Some(result) = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
    else {
        return Ok(BarSeries::new(symbol.clone(), interval, Vec::new()));
    };

    let offset = match result.meta.gmtoffset {
        Some(seconds) => UtcOffset::from_whole_seconds(seconds)
            .map_err(|_| SourceError::malformed(format!("invalid gmtoffset {seconds}")))?,
        None => UtcOffset::UTC,
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(BarSeries::new(symbol.clone(), interval, Vec::new()));
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let ohlc = (
            column(&quote.open, i),
            column(&quote.high, i),
            column(&quote.low, i),
            column(&quote.close, i),
        );
        let (Some(open), Some(high), Some(low), Some(close)) = ohlc else {
            tracing::trace!(ts, "skipping yahoo row with missing prices");
            continue;
        };

        let volume = volume_at(&quote.volume, i)?;
        let start = IntervalStart::from_unix(ts, offset)
            .map_err(|e| SourceError::malformed(e.to_string()))?;
        let bar = IntervalBar::new(start, open, high, low, close, volume)
            .map_err(|e| SourceError::malformed(format!("yahoo row at {start}: {e}")))?;
        bars.push(bar);
    }

    Ok(BarSeries::new(symbol.clone(), interval, bars))
}

fn column(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

fn volume_at(values: &[Option<f64>], index: usize) -> Result<u64, SourceError> {
    match column(values, index) {
        None => Ok(0),
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v as u64),
        Some(v) => Err(SourceError::malformed(format!("invalid yahoo volume {v}"))),
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{CannedHttpClient, HttpError};
    use crate::Lookback;

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").expect("valid symbol")
    }

    #[test]
    fn parses_rows_in_exchange_offset_and_drops_gaps() {
        let body = r#"{"chart":{"result":[{
            "meta":{"symbol":"AAPL","gmtoffset":-18000,"exchangeTimezoneName":"America/New_York"},
            "timestamp":[1704205800,1704209400,1704213000],
            "indicators":{"quote":[{
                "open":[185.1,null,186.0],
                "high":[186.0,186.5,186.9],
                "low":[184.9,185.2,185.7],
                "close":[185.9,185.4,186.2],
                "volume":[1200345,800000,null]
            }]}
        }],"error":null}}"#;

        let series = parse_chart(&aapl(), Interval::OneHour, body).expect("parses");
        assert_eq!(series.bars.len(), 2);

        let first = &series.bars[0];
        assert_eq!(first.start.isoformat(), "2024-01-02T09:30:00-05:00");
        assert_eq!(first.volume, 1_200_345);

        let last = series.latest().expect("has bars");
        assert_eq!(last.start.isoformat(), "2024-01-02T11:30:00-05:00");
        assert_eq!(last.close, 186.2);
        assert_eq!(last.volume, 0);
    }

    #[test]
    fn closed_market_payload_yields_empty_series() {
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":-18000},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let series = parse_chart(&aapl(), Interval::OneHour, body).expect("parses");
        assert!(series.is_empty());
    }

    #[test]
    fn chart_error_object_is_reported() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let error = parse_chart(&aapl(), Interval::OneHour, body).expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert!(error.message().contains("delisted"));
    }

    #[test]
    fn garbage_body_is_malformed() {
        let error = parse_chart(&aapl(), Interval::OneHour, "<html>").expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
    }

    #[test]
    fn negative_volume_is_malformed() {
        let body = r#"{"chart":{"result":[{"meta":{},"timestamp":[0],
            "indicators":{"quote":[{"open":[1.0],"high":[1.0],"low":[1.0],"close":[1.0],"volume":[-5]}]}}]}}"#;
        let error = parse_chart(&aapl(), Interval::OneHour, body).expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
    }

    #[test]
    fn crumb_acceptance_rejects_html_and_errors() {
        assert_eq!(
            accept_crumb(&HttpResponse::ok_json("abcDEF123")),
            Some(String::from("abcDEF123"))
        );
        assert_eq!(accept_crumb(&HttpResponse::ok_json("<html>blocked</html>")), None);
        assert_eq!(accept_crumb(&HttpResponse::new(500, "abc")), None);
        assert_eq!(accept_crumb(&HttpResponse::ok_json("")), None);
    }

    #[tokio::test]
    async fn negotiates_crumb_once_and_appends_it_to_chart_requests() {
        let client = Arc::new(
            CannedHttpClient::new()
                .respond(COOKIE_ENDPOINT, HttpResponse::new(404, ""))
                .respond(CRUMB_ENDPOINTS[0], HttpResponse::ok_json("cr/umb"))
                .respond(
                    CHART_ENDPOINT,
                    HttpResponse::ok_json(r#"{"chart":{"result":[],"error":null}}"#),
                ),
        );
        let adapter = YahooAdapter::new(client.clone());
        let request = BarsRequest::new(aapl(), Interval::OneHour, Lookback::OneDay);

        adapter.bars(request.clone()).await.expect("first call");
        adapter.bars(request).await.expect("second call");

        let urls: Vec<String> = client.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls.len(), 4, "cookie + crumb once, then two chart calls: {urls:?}");
        assert!(urls[2].ends_with("&crumb=cr%2Fumb"));
        assert!(urls[3].contains("range=1d&interval=1h"));
    }

    #[tokio::test]
    async fn rejected_crumb_is_renegotiated_on_the_next_call() {
        let client = Arc::new(
            CannedHttpClient::new()
                .respond(COOKIE_ENDPOINT, HttpResponse::new(404, ""))
                .respond(CRUMB_ENDPOINTS[0], HttpResponse::ok_json("stale"))
                .respond(
                    CHART_ENDPOINT,
                    HttpResponse::new(401, r#"{"finance":{"error":{"code":"Unauthorized","description":"Invalid Crumb"}}}"#),
                ),
        );
        let adapter = YahooAdapter::new(client.clone());
        let request = BarsRequest::new(aapl(), Interval::OneHour, Lookback::OneDay);

        for _ in 0..2 {
            let error = adapter.bars(request.clone()).await.expect_err("401 fails the call");
            assert_eq!(error.kind(), SourceErrorKind::Unauthorized);
        }

        let crumb_calls = client
            .requests()
            .iter()
            .filter(|r| r.url.starts_with(CRUMB_ENDPOINTS[0]))
            .count();
        assert_eq!(crumb_calls, 2);
        assert_eq!(client.requests().len(), 6);
    }

    #[tokio::test]
    async fn crumb_rate_limit_fails_the_call() {
        let client = Arc::new(
            CannedHttpClient::new()
                .respond(COOKIE_ENDPOINT, HttpResponse::new(404, ""))
                .respond(CRUMB_ENDPOINTS[0], HttpResponse::new(429, "Too Many Requests")),
        );
        let adapter = YahooAdapter::new(client);
        let error = adapter
            .bars(BarsRequest::new(aapl(), Interval::OneHour, Lookback::OneDay))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn transport_failure_is_unavailable() {
        let client = Arc::new(
            CannedHttpClient::new().fail(CHART_ENDPOINT, HttpError::new("connection reset")),
        );
        let adapter = YahooAdapter::new(client).without_session();
        let error = adapter
            .bars(BarsRequest::new(aapl(), Interval::OneHour, Lookback::OneDay))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert!(error.message().contains("connection reset"));
    }

    #[tokio::test]
    async fn not_found_status_carries_chart_description() {
        let client = Arc::new(CannedHttpClient::new().respond(
            CHART_ENDPOINT,
            HttpResponse::new(
                404,
                r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#,
            ),
        ));
        let adapter = YahooAdapter::new(client).without_session();
        let error = adapter
            .bars(BarsRequest::new(aapl(), Interval::OneHour, Lookback::OneDay))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert!(error.message().contains("No data found"));
    }
}
