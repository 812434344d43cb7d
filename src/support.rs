use crate::{dynamodb::DynamoDBClient, error::RuntimeError, util::clear_empty_strings};
use aws_sdk_support::{
    error::DescribeCasesError,
    model::{CaseDetails, Communication},
    types::SdkError,
    Client, Error,
};
use aws_types::{region::Region, SdkConfig};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

/// The Support API is only served reliably from this region.
pub const SUPPORT_REGION: &str = "us-east-1";

/// Error code returned for accounts without a Business or Enterprise plan.
const SUBSCRIPTION_REQUIRED: &str = "SubscriptionRequiredException";

/// Status stored in place of a case that cannot be read.
pub const SUBSCRIPTION_REQUIRED_STATUS: &str = "** N/A; Must Enable Enterprise Support **";

/// Cases requested per page on account-wide lookups.
const PAGE_SIZE: i32 = 100;

/// Upper bound on pages read for one account in a single pass.
const MAX_PAGES: usize = 1000;

/// Support configuration for the given credentials, pinned to [`SUPPORT_REGION`].
pub fn support_config(config: &SdkConfig) -> aws_sdk_support::Config {
    aws_sdk_support::config::Builder::from(config)
        .region(Region::new(SUPPORT_REGION))
        .build()
}

fn is_subscription_required(err: &SdkError<DescribeCasesError>) -> bool {
    match err {
        SdkError::ServiceError { err, .. } => err.code() == Some(SUBSCRIPTION_REQUIRED),
        _ => false,
    }
}

/// Render a case as the record stored in the table.
///
/// `recentCommunications` only ever holds the last five messages. Its
/// continuation token is not kept since nothing reads further pages.
/// Empty strings are removed and the account id is attached.
pub fn case_record(case: &CaseDetails, account_id: &str) -> Map<String, Value> {
    let mut record = Map::new();
    insert_str(&mut record, "caseId", case.case_id());
    insert_str(&mut record, "displayId", case.display_id());
    insert_str(&mut record, "subject", case.subject());
    insert_str(&mut record, "status", case.status());
    insert_str(&mut record, "serviceCode", case.service_code());
    insert_str(&mut record, "categoryCode", case.category_code());
    insert_str(&mut record, "severityCode", case.severity_code());
    insert_str(&mut record, "submittedBy", case.submitted_by());
    insert_str(&mut record, "timeCreated", case.time_created());
    insert_str(&mut record, "language", case.language());

    if let Some(addresses) = case.cc_email_addresses() {
        record.insert("ccEmailAddresses".into(), json!(addresses));
    }

    if let Some(recent) = case.recent_communications() {
        let mut communications = Map::new();
        if let Some(items) = recent.communications() {
            communications.insert(
                "communications".into(),
                Value::Array(items.iter().map(communication_record).collect()),
            );
        }
        record.insert("recentCommunications".into(), Value::Object(communications));
    }

    let mut record = match clear_empty_strings(Value::Object(record)) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    record.insert("AccountId".into(), Value::String(account_id.into()));
    record
}

fn communication_record(communication: &Communication) -> Value {
    let mut record = Map::new();
    insert_str(&mut record, "caseId", communication.case_id());
    insert_str(&mut record, "body", communication.body());
    insert_str(&mut record, "submittedBy", communication.submitted_by());
    insert_str(&mut record, "timeCreated", communication.time_created());

    if let Some(attachments) = communication.attachment_set() {
        let attachments = attachments
            .iter()
            .map(|attachment| {
                let mut details = Map::new();
                insert_str(&mut details, "attachmentId", attachment.attachment_id());
                insert_str(&mut details, "fileName", attachment.file_name());
                Value::Object(details)
            })
            .collect();
        record.insert("attachmentSet".into(), Value::Array(attachments));
    }

    Value::Object(record)
}

fn insert_str(record: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        record.insert(key.into(), Value::String(value.into()));
    }
}

/// Record written for a case in an account without the required support plan.
pub fn subscription_required_record(case_id: &str, account_id: &str) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("caseId".into(), Value::String(case_id.into()));
    record.insert(
        "status".into(),
        Value::String(SUBSCRIPTION_REQUIRED_STATUS.into()),
    );
    record.insert("AccountId".into(), Value::String(account_id.into()));
    record
}

/// Refresh the given cases of one account, one lookup per case.
///
/// A missing support plan turns a case into a placeholder record and
/// moves on. Any other lookup error stops the batch: cases read so far
/// are still written before the error is returned.
#[tracing::instrument(skip(client, store, case_ids), fields(cases = case_ids.len()))]
pub async fn sync_case_ids(
    client: &Client,
    store: &DynamoDBClient,
    account_id: &str,
    case_ids: &[String],
) -> Result<bool, RuntimeError> {
    let mut records = Vec::with_capacity(case_ids.len());

    for case_id in case_ids {
        let res = client
            .describe_cases()
            .case_id_list(case_id)
            .include_resolved_cases(true)
            .send()
            .await;

        let output = match res {
            Ok(output) => output,
            Err(sdk_err) if is_subscription_required(&sdk_err) => {
                tracing::error!(
                    account_id,
                    case_id = %case_id,
                    "failed subscription for account, need Enterprise Support; ignoring"
                );
                store
                    .put_case(subscription_required_record(case_id, account_id))
                    .await?;
                continue;
            }
            Err(sdk_err) => {
                let err = Error::from(sdk_err);
                tracing::error!(case_id = %case_id, error = %err, "error on case");
                store.batch_put_cases(records).await?;
                return Err(RuntimeError::Support(err));
            }
        };

        match output.cases().and_then(|cases| cases.first()) {
            Some(case) => records.push(case_record(case, account_id)),
            None => {
                tracing::error!(case_id = %case_id, "case lookup returned no case");
                store.batch_put_cases(records).await?;
                return Err(RuntimeError::MissingCase(case_id.clone()));
            }
        }
    }

    store.batch_put_cases(records).await?;
    Ok(true)
}

/// Refresh every case of one account, optionally only those updated
/// after `after_time`. Each page is written as soon as it is read.
///
/// An account without the required support plan is skipped.
#[tracing::instrument(skip(client, store))]
pub async fn sync_cases(
    client: &Client,
    store: &DynamoDBClient,
    account_id: &str,
    after_time: Option<String>,
) -> Result<usize, RuntimeError> {
    let mut next_token: Option<String> = None;
    let mut synced = 0;

    for _ in 0..MAX_PAGES {
        let res = client
            .describe_cases()
            .include_resolved_cases(true)
            .max_results(PAGE_SIZE)
            .set_after_time(after_time.clone())
            .set_next_token(next_token.take())
            .send()
            .await;

        let output = match res {
            Ok(output) => output,
            Err(sdk_err) if is_subscription_required(&sdk_err) => {
                tracing::error!(account_id, "failed subscription for account; ignoring");
                return Ok(synced);
            }
            Err(sdk_err) => return Err(Error::from(sdk_err).into()),
        };

        let records: Vec<_> = output
            .cases()
            .unwrap_or_default()
            .iter()
            .map(|case| case_record(case, account_id))
            .collect();
        synced += records.len();
        store.batch_put_cases(records).await?;

        match output.next_token() {
            Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
            _ => {
                tracing::info!(synced, "cases synced");
                return Ok(synced);
            }
        }
    }

    tracing::warn!(synced, max_pages = MAX_PAGES, "stopped paging support cases");
    Ok(synced)
}

/// Start of the look-back window ending at `now`.
pub fn lookback_start(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, RuntimeError> {
    chrono::Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or(RuntimeError::InvalidLookback(days))
}

/// Refresh the cases of one account updated in the last `days` days.
pub async fn update_recent_cases(
    client: &Client,
    store: &DynamoDBClient,
    account_id: &str,
    days: i64,
) -> Result<usize, RuntimeError> {
    let after_time = lookback_start(Utc::now(), days)?;
    sync_cases(client, store, account_id, Some(after_time.to_rfc3339())).await
}

/// Refresh every case ever opened in one account.
pub async fn update_all_cases(
    client: &Client,
    store: &DynamoDBClient,
    account_id: &str,
) -> Result<usize, RuntimeError> {
    sync_cases(client, store, account_id, None).await
}
