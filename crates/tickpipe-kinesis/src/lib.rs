//! Kinesis-backed [`RecordSink`].
//!
//! One `PutRecord` call per record. SDK failures are classified into
//! [`SinkErrorKind`] and carry the full SDK error chain in their message.

use std::future::Future;
use std::pin::Pin;

use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_kinesis::error::{DisplayErrorContext, SdkError};
use aws_sdk_kinesis::operation::put_record::PutRecordError;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::Client;
use tickpipe_core::{PutReceipt, PutRecord, RecordSink, SinkError, SinkErrorKind};

/// Region used when neither the environment nor the profile names one.
pub const FALLBACK_REGION: &str = "us-east-1";

/// Sink writing to Kinesis Data Streams.
#[derive(Debug, Clone)]
pub struct KinesisSink {
    client: Client,
}

impl KinesisSink {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default credential and region chain.
    pub async fn from_env() -> Self {
        let region = RegionProviderChain::default_provider().or_else(Region::new(FALLBACK_REGION));
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        tracing::debug!(region = ?sdk_config.region(), "kinesis client configured");
        Self::new(Client::new(&sdk_config))
    }
}

impl RecordSink for KinesisSink {
    fn put_record<'a>(
        &'a self,
        record: PutRecord,
    ) -> Pin<Box<dyn Future<Output = Result<PutReceipt, SinkError>> + Send + 'a>> {
        Box::pin(async move {
            let output = self
                .client
                .put_record()
                .stream_name(&record.stream_name)
                .partition_key(&record.partition_key)
                .data(Blob::new(record.data))
                .send()
                .await
                .map_err(|e| sink_error(&record.stream_name, e))?;

            Ok(PutReceipt {
                shard_id: output.shard_id().to_owned(),
                sequence_number: output.sequence_number().to_owned(),
            })
        })
    }
}

fn sink_error<R>(stream_name: &str, error: SdkError<PutRecordError, R>) -> SinkError
where
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let kind = error
        .as_service_error()
        .map_or(SinkErrorKind::Unavailable, classify);

    SinkError::new(
        kind,
        format!(
            "kinesis put_record to '{stream_name}' failed: {}",
            DisplayErrorContext(&error)
        ),
    )
}

fn classify(error: &PutRecordError) -> SinkErrorKind {
    if error.is_resource_not_found_exception() {
        SinkErrorKind::NotFound
    } else if error.is_access_denied_exception() || error.is_kms_access_denied_exception() {
        SinkErrorKind::AccessDenied
    } else if error.is_provisioned_throughput_exceeded_exception()
        || error.is_kms_throttling_exception()
    {
        SinkErrorKind::Throttled
    } else {
        SinkErrorKind::Unavailable
    }
}
