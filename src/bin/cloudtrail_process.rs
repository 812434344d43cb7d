use aws_sdk_lambda::Client as LambdaClient;
use aws_sdk_s3::Client as S3Client;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use support_cases_sync::{handle_cloudtrail_notification, logging, Settings};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let settings = Settings::from_env()?;
    logging::init(settings.logging_level.as_deref());

    // Get AWS Configuration
    let config = aws_config::load_from_env().await;
    let s3_client = S3Client::new(&config);
    let lambda_client = LambdaClient::new(&config);

    let aggregator_function = settings.aggregator_function()?;

    run(service_fn(|event: LambdaEvent<Value>| {
        handle_cloudtrail_notification(&s3_client, &lambda_client, aggregator_function, event)
    }))
    .await
}
