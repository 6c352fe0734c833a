//! Stock quote publisher: fetch the latest bar, publish it, report.

use std::sync::Arc;

use crate::config::QuotePublisherConfig;
use crate::data_source::{BarsRequest, DataSource};
use crate::response::InvocationResponse;
use crate::sink::{PutReceipt, PutRecord, RecordSink};
use crate::{PublishError, QuoteRecord};

pub const SUCCESS_MESSAGE: &str = "Quote data published to Kinesis successfully";

/// Record that reached the stream, with the stream's receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedQuote {
    pub record: QuoteRecord,
    pub receipt: PutReceipt,
}

/// One straight-line invocation per call; holds no state between calls.
pub struct QuotePublisher {
    config: QuotePublisherConfig,
    source: Arc<dyn DataSource>,
    sink: Arc<dyn RecordSink>,
}

impl QuotePublisher {
    pub fn new(
        config: QuotePublisherConfig,
        source: Arc<dyn DataSource>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            config,
            source,
            sink,
        }
    }

    pub fn config(&self) -> &QuotePublisherConfig {
        &self.config
    }

    /// Trigger entry point. Any failure is returned as-is; there is no
    /// error-shaped success response.
    pub async fn handle(&self) -> Result<InvocationResponse, PublishError> {
        self.publish_latest().await?;
        Ok(InvocationResponse::message(200, SUCCESS_MESSAGE)?)
    }

    pub async fn publish_latest(&self) -> Result<PublishedQuote, PublishError> {
        let config = &self.config;
        let request = BarsRequest::new(config.symbol.clone(), config.interval, config.lookback);
        let series = self.source.bars(request).await?;

        let bar = series.latest().ok_or_else(|| PublishError::EmptySeries {
            symbol: config.symbol.clone(),
            interval: config.interval,
            lookback: config.lookback,
        })?;
        let record = QuoteRecord::from_bar(config.user_id, config.symbol.clone(), bar);

        let receipt = self
            .sink
            .put_record(PutRecord {
                stream_name: config.stream_name.clone(),
                partition_key: config.symbol.partition_key().to_owned(),
                data: serde_json::to_vec(&record)?,
            })
            .await?;

        tracing::info!(
            provider = self.source.name(),
            symbol = %config.symbol,
            stream = %config.stream_name,
            datetime = %record.timestamp,
            shard_id = %receipt.shard_id,
            sequence_number = %receipt.sequence_number,
            "published quote record"
        );

        Ok(PublishedQuote { record, receipt })
    }
}
