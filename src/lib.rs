#![deny(missing_docs)]
//! <fullname>Support cases sync</fullname>
//!
//! Lambda functions that keep a DynamoDB table of AWS Support cases
//! opened in any account of an AWS Organization.
//!
//! The CloudTrail processor receives notifications for new CloudTrail
//! log files, finds support case activity in them, and asks the
//! aggregator to refresh those cases, once per account. The aggregator
//! reads cases through the Support API of each member account and
//! upserts them in the table, either on request or on a schedule.
use aws_sdk_lambda::Client as LambdaClient;
use aws_sdk_s3::Client as S3Client;
use lambda_runtime::LambdaEvent;
use serde_json::Value;

mod aggregator;
pub use aggregator::Aggregator;

mod cloudtrail;
pub use cloudtrail::{support_cases_by_account, CloudTrailLog, CloudTrailRecord};

mod conf;
pub use conf::Settings;

mod dispatch;
pub use dispatch::{dispatch_aggregations, AggregationRequest};

mod dynamodb;
pub use dynamodb::DynamoDBClient;

mod error;
pub use error::RuntimeError;

mod event;
pub use event::{S3Bucket, S3Entity, S3EventRecord, S3Notification, S3Object};

/// `logging` sets up the tracing subscriber
pub mod logging;

mod organizations;

/// `s3` fetches and decodes objects referenced by S3 notifications
pub mod s3;

/// `sts` includes helpers to work with AWS STS
pub mod sts;

/// `support` reads cases from the AWS Support API
pub mod support;

mod trigger;
pub use trigger::Trigger;

/// `util` holds small string and JSON helpers
pub mod util;

#[cfg(test)]
mod test_util;

/// `handle_cloudtrail_notification` is the CloudTrail processor entry point
/// that receives S3 notifications for new CloudTrail log files
#[tracing::instrument(skip(s3_client, lambda_client, event), fields(request_id = %event.context.request_id))]
pub async fn handle_cloudtrail_notification(
    s3_client: &S3Client,
    lambda_client: &LambdaClient,
    aggregator_function: &str,
    event: LambdaEvent<Value>,
) -> Result<(), RuntimeError> {
    let objects = s3::get_gzipped_s3_objects(s3_client, event.payload).await?;
    tracing::info!(objects = objects.len(), "retrieved s3 objects");
    tracing::debug!(?objects);

    let logs = objects
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<CloudTrailLog>, _>>()?;

    let cases = support_cases_by_account(&logs);
    dispatch_aggregations(lambda_client, aggregator_function, cases).await?;

    Ok(())
}

/// `handle_aggregation` is the aggregator entry point that receives
/// scheduled events, manual updates, and per-account case lists
#[tracing::instrument(skip(aggregator, event), fields(request_id = %event.context.request_id))]
pub async fn handle_aggregation(
    aggregator: &Aggregator,
    event: LambdaEvent<Value>,
) -> Result<bool, RuntimeError> {
    tracing::debug!(payload = ?event.payload);
    let trigger = Trigger::from_payload(event.payload)?;
    aggregator.handle(trigger).await
}
