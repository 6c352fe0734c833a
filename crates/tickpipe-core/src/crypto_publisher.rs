//! CoinMarketCap publisher.
//!
//! Unlike [`QuotePublisher`](crate::publisher::QuotePublisher) this one
//! answers every outcome in-band: 200 when published, 404 when the currency
//! is not listed, 500 with the error text otherwise. Bodies are compact JSON.

use std::sync::Arc;

use serde::Serialize;

use crate::adapters::CoinMarketCapAdapter;
use crate::config::CryptoPublisherConfig;
use crate::response::InvocationResponse;
use crate::sink::{PutReceipt, PutRecord, RecordSink};
use crate::{CryptoRecord, PublishError};

pub const NOT_FOUND_MESSAGE: &str = "Currency not found";
pub const FAILURE_MESSAGE: &str = "Error fetching data or publishing to Kinesis";

#[derive(Debug, Clone, PartialEq)]
pub enum CryptoOutcome {
    Published {
        currency_name: String,
        record: CryptoRecord,
        receipt: PutReceipt,
    },
    NotListed,
}

#[derive(Serialize)]
struct PublishedBody<'a> {
    message: String,
    #[serde(rename = "cryptoData")]
    crypto_data: &'a CryptoRecord,
}

#[derive(Serialize)]
struct FailureBody<'a> {
    message: &'a str,
    error: String,
}

pub struct CryptoPublisher {
    config: CryptoPublisherConfig,
    source: CoinMarketCapAdapter,
    sink: Arc<dyn RecordSink>,
}

impl CryptoPublisher {
    pub fn new(
        config: CryptoPublisherConfig,
        source: CoinMarketCapAdapter,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            config,
            source,
            sink,
        }
    }

    pub async fn handle(&self) -> Result<InvocationResponse, serde_json::Error> {
        match self.publish().await {
            Ok(CryptoOutcome::Published {
                currency_name,
                record,
                ..
            }) => InvocationResponse::compact_json(
                200,
                &PublishedBody {
                    message: format!("Data for {currency_name} published to Kinesis"),
                    crypto_data: &record,
                },
            ),
            Ok(CryptoOutcome::NotListed) => InvocationResponse::compact_message(404, NOT_FOUND_MESSAGE),
            Err(error) => {
                tracing::error!(error = %error, currency = %self.config.currency_name, "crypto publish failed");
                InvocationResponse::compact_json(
                    500,
                    &FailureBody {
                        message: FAILURE_MESSAGE,
                        error: error.to_string(),
                    },
                )
            }
        }
    }

    pub async fn publish(&self) -> Result<CryptoOutcome, PublishError> {
        let config = &self.config;
        let Some(listing) = self.source.find_by_name(&config.currency_name).await? else {
            tracing::warn!(currency = %config.currency_name, "currency not listed");
            return Ok(CryptoOutcome::NotListed);
        };

        let record = CryptoRecord {
            user_id: config.user_id,
            name: listing.symbol.clone(),
            price: listing.price,
            variation_24h: listing.percent_change_24h,
            market_cap: listing.market_cap,
        };

        let receipt = self
            .sink
            .put_record(PutRecord {
                stream_name: config.stream_name.clone(),
                partition_key: config.currency_name.clone(),
                data: serde_json::to_vec(&record)?,
            })
            .await?;

        tracing::info!(
            currency = %listing.name,
            stream = %config.stream_name,
            shard_id = %receipt.shard_id,
            sequence_number = %receipt.sequence_number,
            "published crypto record"
        );

        Ok(CryptoOutcome::Published {
            currency_name: listing.name,
            record,
            receipt,
        })
    }
}
