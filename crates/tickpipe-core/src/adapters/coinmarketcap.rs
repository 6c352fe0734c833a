use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::data_source::SourceError;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};

const PROVIDER: &str = "coinmarketcap";
const LISTINGS_ENDPOINT: &str =
    "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
const CONVERT: &str = "USD";

/// USD snapshot of one listed cryptocurrency.
#[derive(Debug, Clone, PartialEq)]
pub struct CryptoListing {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub percent_change_24h: f64,
    pub market_cap: f64,
}

/// CoinMarketCap "latest listings" adapter.
pub struct CoinMarketCapAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    limit: u32,
}

impl CoinMarketCapAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            auth: HttpAuth::Header {
                name: String::from(API_KEY_HEADER),
                value: api_key.into(),
            },
            limit: 5_000,
        }
    }

    /// Look a currency up by its display name, ignoring case.
    ///
    /// `Ok(None)` means the listing call worked but the currency is not in
    /// it. Only the matched entry needs a complete USD quote.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<CryptoListing>, SourceError> {
        let listings = self.fetch_listings().await?;
        let wanted = name.trim().to_lowercase();

        listings
            .into_iter()
            .find(|entry| entry.name.to_lowercase() == wanted)
            .map(RawListing::into_listing)
            .transpose()
    }

    async fn fetch_listings(&self) -> Result<Vec<RawListing>, SourceError> {
        let url = format!("{LISTINGS_ENDPOINT}?start=1&limit={}&convert={CONVERT}", self.limit);
        let request = HttpRequest::get(url)
            .with_header("accepts", "application/json")
            .with_auth(&self.auth);

        tracing::debug!(limit = self.limit, "requesting coinmarketcap listings");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::transport(PROVIDER, &e))?;

        if !response.is_success() {
            let error = SourceError::from_status(PROVIDER, response.status);
            return Err(
                match serde_json::from_str::<ListingsEnvelope>(&response.body)
                    .ok()
                    .and_then(|envelope| envelope.status.error_message)
                {
                    Some(detail) => error.with_detail(detail),
                    None => error,
                },
            );
        }

        let envelope: ListingsEnvelope = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::malformed(format!("failed to parse coinmarketcap listings: {e}"))
        })?;
        Ok(envelope.data)
    }
}

#[derive(Debug, Deserialize)]
struct ListingsEnvelope {
    #[serde(default)]
    status: ListingsStatus,
    #[serde(default)]
    data: Vec<RawListing>,
}

#[derive(Debug, Default, Deserialize)]
struct ListingsStatus {
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawListing {
    name: String,
    symbol: String,
    #[serde(default)]
    quote: HashMap<String, RawQuote>,
}

#[derive(Debug, Deserialize)]
struct RawQuote {
    price: Option<f64>,
    percent_change_24h: Option<f64>,
    market_cap: Option<f64>,
}

impl RawListing {
    fn into_listing(mut self) -> Result<CryptoListing, SourceError> {
        let missing = |field: &str| {
            SourceError::malformed(format!(
                "coinmarketcap listing '{}' has no {CONVERT} {field}",
                self.name
            ))
        };

        let quote = self.quote.remove(CONVERT).ok_or_else(|| missing("quote"))?;
        let price = quote.price.ok_or_else(|| missing("price"))?;
        let percent_change_24h = quote
            .percent_change_24h
            .ok_or_else(|| missing("percent_change_24h"))?;
        let market_cap = quote.market_cap.ok_or_else(|| missing("market_cap"))?;

        Ok(CryptoListing {
            name: self.name,
            symbol: self.symbol,
            price,
            percent_change_24h,
            market_cap,
        })
    }
}
