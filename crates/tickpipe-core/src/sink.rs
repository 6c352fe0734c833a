//! Record sink contract.
//!
//! A sink accepts one opaque payload per call and routes it by partition key.
//! Ordering per key is a property of the concrete stream, not of this trait.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

/// One record bound for a named stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecord {
    pub stream_name: String,
    pub partition_key: String,
    pub data: Vec<u8>,
}

/// Where the stream placed an accepted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
    pub shard_id: String,
    pub sequence_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkErrorKind {
    /// Destination stream does not exist.
    NotFound,
    AccessDenied,
    /// Provisioned throughput exceeded.
    Throttled,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    kind: SinkErrorKind,
    message: String,
}

impl SinkError {
    pub fn new(kind: SinkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SinkErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SinkErrorKind::NotFound => "sink.not_found",
            SinkErrorKind::AccessDenied => "sink.access_denied",
            SinkErrorKind::Throttled => "sink.throttled",
            SinkErrorKind::Unavailable => "sink.unavailable",
        }
    }
}

impl Display for SinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SinkError {}

/// Stream writer contract.
pub trait RecordSink: Send + Sync {
    fn put_record<'a>(
        &'a self,
        record: PutRecord,
    ) -> Pin<Box<dyn Future<Output = Result<PutReceipt, SinkError>> + Send + 'a>>;
}

/// In-process sink that keeps accepted records in memory.
///
/// Streams named in `reject` fail with `NotFound`, which is how an
/// unreachable or misconfigured destination looks from the caller's side.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<PutRecord>>,
    reject: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(stream_name: impl Into<String>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            reject: vec![stream_name.into()],
        }
    }

    pub fn records(&self) -> Vec<PutRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl RecordSink for MemorySink {
    fn put_record<'a>(
        &'a self,
        record: PutRecord,
    ) -> Pin<Box<dyn Future<Output = Result<PutReceipt, SinkError>> + Send + 'a>> {
        Box::pin(async move {
            if self.reject.contains(&record.stream_name) {
                return Err(SinkError::new(
                    SinkErrorKind::NotFound,
                    format!("stream '{}' not found", record.stream_name),
                ));
            }

            let mut records = match self.records.lock() {
                Ok(records) => records,
                Err(poisoned) => poisoned.into_inner(),
            };
            records.push(record);

            Ok(PutReceipt {
                shard_id: String::from("shardId-000000000000"),
                sequence_number: records.len().to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(stream: &str) -> PutRecord {
        PutRecord {
            stream_name: stream.to_owned(),
            partition_key: String::from("AAPL"),
            data: b"{}".to_vec(),
        }
    }

    #[tokio::test]
    async fn memory_sink_keeps_records_in_order() {
        let sink = MemorySink::new();
        let first = sink.put_record(record("quotes")).await.expect("accepted");
        let second = sink.put_record(record("quotes")).await.expect("accepted");

        assert_eq!(first.sequence_number, "1");
        assert_eq!(second.sequence_number, "2");
        assert_eq!(sink.records().len(), 2);
    }

    #[tokio::test]
    async fn rejected_stream_is_not_found() {
        let sink = MemorySink::rejecting("missing");
        let error = sink.put_record(record("missing")).await.expect_err("rejected");
        assert_eq!(error.kind(), SinkErrorKind::NotFound);
        assert_eq!(error.code(), "sink.not_found");
        assert!(sink.records().is_empty());
    }
}
