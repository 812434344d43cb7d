use crate::error::RuntimeError;
use aws_sdk_dynamodb::{
    model::{AttributeValue, PutRequest, WriteRequest},
    Client, Error,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Maximum number of items DynamoDB accepts in one BatchWriteItem call.
const BATCH_WRITE_LIMIT: usize = 25;

/// Times a chunk is resubmitted while DynamoDB reports unprocessed items.
const MAX_BATCH_ATTEMPTS: usize = 8;

/// DynamoDB client implementation.
pub struct DynamoDBClient {
    inner: Client,
    table: String,
}

impl DynamoDBClient {
    /// Initialize the DynamoDB store.
    #[tracing::instrument(skip(config))]
    pub async fn new(config: &aws_types::SdkConfig, table: &str) -> DynamoDBClient {
        tracing::info!("Initializing DynamoDB client");
        let inner = aws_sdk_dynamodb::Client::new(config);
        DynamoDBClient {
            inner,
            table: table.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_client(inner: Client, table: &str) -> DynamoDBClient {
        DynamoDBClient {
            inner,
            table: table.into(),
        }
    }

    /// Upsert a single case record.
    #[tracing::instrument(skip(self, record))]
    pub async fn put_case(&self, record: Map<String, Value>) -> Result<(), RuntimeError> {
        self.inner
            .put_item()
            .table_name(&self.table)
            .set_item(Some(to_item(record)))
            .send()
            .await
            .map_err(Error::from)?;

        Ok(())
    }

    /// Upsert case records with BatchWriteItem, resubmitting the
    /// items DynamoDB leaves unprocessed.
    #[tracing::instrument(skip(self, records), fields(records = records.len()))]
    pub async fn batch_put_cases(
        &self,
        records: Vec<Map<String, Value>>,
    ) -> Result<(), RuntimeError> {
        let mut requests: Vec<WriteRequest> = records
            .into_iter()
            .map(|record| {
                WriteRequest::builder()
                    .put_request(PutRequest::builder().set_item(Some(to_item(record))).build())
                    .build()
            })
            .collect();

        while !requests.is_empty() {
            let rest = requests.split_off(requests.len().min(BATCH_WRITE_LIMIT));
            self.write_chunk(requests).await?;
            requests = rest;
        }

        Ok(())
    }

    async fn write_chunk(&self, chunk: Vec<WriteRequest>) -> Result<(), RuntimeError> {
        let mut pending = HashMap::from([(self.table.clone(), chunk)]);

        for _ in 0..MAX_BATCH_ATTEMPTS {
            let res = self
                .inner
                .batch_write_item()
                .set_request_items(Some(pending))
                .send()
                .await
                .map_err(Error::from)?;

            pending = res
                .unprocessed_items
                .unwrap_or_default()
                .into_iter()
                .filter(|(_, requests)| !requests.is_empty())
                .collect();

            if pending.is_empty() {
                return Ok(());
            }
            tracing::warn!("resubmitting unprocessed items");
        }

        Err(RuntimeError::UnprocessedItems(
            pending.values().map(Vec::len).sum(),
        ))
    }
}

/// Convert a JSON object into a DynamoDB item.
pub fn to_item(record: Map<String, Value>) -> HashMap<String, AttributeValue> {
    record
        .into_iter()
        .map(|(k, v)| (k, to_attribute_value(v)))
        .collect()
}

fn to_attribute_value(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(items) => {
            AttributeValue::L(items.into_iter().map(to_attribute_value).collect())
        }
        Value::Object(map) => AttributeValue::M(to_item(map)),
    }
}
