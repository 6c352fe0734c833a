use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tickpipe_core::{InvocationResponse, QuotePublisher};
use tickpipe_lambda::{bootstrap, telemetry};
use tokio::sync::OnceCell;

static PUBLISHER: OnceCell<QuotePublisher> = OnceCell::const_new();

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init()?;
    lambda_runtime::run(service_fn(handle)).await
}

// The trigger payload carries nothing the publisher needs.
async fn handle(event: LambdaEvent<Value>) -> Result<InvocationResponse, Error> {
    let publisher = PUBLISHER.get_or_try_init(bootstrap::quote_publisher).await?;

    tracing::debug!(request_id = %event.context.request_id, "invocation started");
    match publisher.handle().await {
        Ok(response) => Ok(response),
        Err(error) => {
            tracing::error!(error = %error, symbol = %publisher.config().symbol, "quote publish failed");
            Err(error.into())
        }
    }
}
