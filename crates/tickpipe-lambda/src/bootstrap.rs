//! Publisher construction from the process environment.

use std::sync::Arc;

use tickpipe_core::{
    CoinMarketCapAdapter, CryptoPublisher, CryptoPublisherConfig, HttpAuth, QuotePublisher,
    QuotePublisherConfig, ReqwestHttpClient, YahooAdapter,
};
use tickpipe_kinesis::KinesisSink;

pub async fn quote_publisher() -> Result<QuotePublisher, lambda_runtime::Error> {
    let config = QuotePublisherConfig::from_env()?;
    let http_client = Arc::new(ReqwestHttpClient::try_new()?);

    let mut source = YahooAdapter::new(http_client);
    if let Some(cookie) = &config.yahoo_cookie {
        source = source.with_auth(HttpAuth::Cookie(cookie.clone()));
    }
    let sink = KinesisSink::from_env().await;

    tracing::info!(
        symbol = %config.symbol,
        interval = %config.interval,
        lookback = %config.lookback,
        stream = %config.stream_name,
        "quote publisher ready"
    );
    Ok(QuotePublisher::new(config, Arc::new(source), Arc::new(sink)))
}

pub async fn crypto_publisher() -> Result<CryptoPublisher, lambda_runtime::Error> {
    let config = CryptoPublisherConfig::from_env()?;
    let http_client = Arc::new(ReqwestHttpClient::try_new()?);
    let source = CoinMarketCapAdapter::new(http_client, config.api_key.clone());
    let sink = KinesisSink::from_env().await;

    tracing::info!(
        currency = %config.currency_name,
        stream = %config.stream_name,
        "crypto publisher ready"
    );
    Ok(CryptoPublisher::new(config, source, Arc::new(sink)))
}
