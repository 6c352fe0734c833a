//! `tracing` subscriber for the Lambda binaries.
//!
//! CloudWatch stamps every line itself, so output carries no timestamp and
//! no ANSI colouring.

use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_DIRECTIVES: &str = "warn,tickpipe_core=info,tickpipe_kinesis=info,tickpipe_lambda=info,yahoo_finance_publisher=info,coinmarketcap_publisher=info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init() -> Result<(), lambda_runtime::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_ansi(false)
        .without_time()
        .with_target(true)
        .try_init()
}

pub fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}
