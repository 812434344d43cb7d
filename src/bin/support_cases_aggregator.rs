use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use support_cases_sync::{handle_aggregation, logging, Aggregator, Settings};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let settings = Settings::from_env()?;
    logging::init(settings.logging_level.as_deref());

    // Get AWS Configuration
    let config = aws_config::load_from_env().await;
    let aggregator = Aggregator::new(config, settings).await?;

    run(service_fn(|event: LambdaEvent<Value>| {
        handle_aggregation(&aggregator, event)
    }))
    .await
}
