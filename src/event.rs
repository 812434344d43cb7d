use crate::error::RuntimeError;
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;

/// `S3Notification` represents an S3 "objects stored" notification
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct S3Notification {
    /// One record per stored object
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

/// `S3EventRecord` points at one stored object
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct S3EventRecord {
    /// Location of the object
    pub s3: S3Entity,
}

/// `S3Entity` holds the location of the stored object
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct S3Entity {
    /// Bucket holding the object
    pub bucket: S3Bucket,
    /// The object itself
    pub object: S3Object,
}

/// `S3Bucket` is the bucket part of an S3 entity
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct S3Bucket {
    /// Bucket name
    pub name: String,
}

/// `S3Object` is the object part of an S3 entity.
/// The key is still url-escaped.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct S3Object {
    /// Url-escaped object key
    pub key: String,
}

/// `SnsNotification` is an SNS delivery whose messages are
/// JSON-encoded S3 notifications
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SnsNotification {
    /// One record per delivered message
    #[serde(rename = "Records", default)]
    pub records: Vec<SnsRecord>,
}

/// `SnsRecord` wraps one SNS message
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SnsRecord {
    /// The SNS envelope
    #[serde(rename = "Sns")]
    pub sns: SnsMessage,
}

/// `SnsMessage` carries the raw message text
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SnsMessage {
    /// JSON-encoded S3 notification
    #[serde(rename = "Message")]
    pub message: String,
}

/// Check whether the event is a direct S3 notification, looking
/// for the `s3` key in its first record.
pub fn is_s3_notification(event: &Value) -> bool {
    event
        .get("Records")
        .and_then(Value::as_array)
        .and_then(|records| records.first())
        .map(|record| record.get("s3").is_some())
        .unwrap_or(false)
}

/// Normalize a direct or SNS-wrapped notification into the
/// S3 notifications it carries, in delivery order.
pub fn into_s3_notifications(event: Value) -> Result<Vec<S3Notification>, RuntimeError> {
    if is_s3_notification(&event) {
        return Ok(vec![serde_json::from_value(event)?]);
    }

    let sns: SnsNotification = serde_json::from_value(event)
        .map_err(|e| RuntimeError::InvalidNotification(e.to_string()))?;

    sns.records
        .iter()
        .map(|record| serde_json::from_str(&record.sns.message).map_err(RuntimeError::from))
        .collect()
}

/// Decompress a gzipped object and parse it as JSON.
/// Objects made of several concatenated gzip members are read to the end.
pub fn gunzip_json(bytes: &[u8]) -> Result<Value, RuntimeError> {
    let mut raw = Vec::new();
    flate2::read::MultiGzDecoder::new(bytes).read_to_end(&mut raw)?;

    let value = match String::from_utf8(raw) {
        Ok(text) => serde_json::from_str(&text)?,
        Err(not_utf8) => serde_json::from_slice(not_utf8.as_bytes())?,
    };
    Ok(value)
}
