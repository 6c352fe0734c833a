use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tickpipe_core::{CryptoPublisher, InvocationResponse};
use tickpipe_lambda::{bootstrap, telemetry};
use tokio::sync::OnceCell;

static PUBLISHER: OnceCell<CryptoPublisher> = OnceCell::const_new();

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init()?;
    lambda_runtime::run(service_fn(handle)).await
}

async fn handle(event: LambdaEvent<Value>) -> Result<InvocationResponse, Error> {
    let publisher = PUBLISHER.get_or_try_init(bootstrap::crypto_publisher).await?;

    tracing::debug!(request_id = %event.context.request_id, "invocation started");
    Ok(publisher.handle().await?)
}
