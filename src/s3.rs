use crate::{
    error::RuntimeError,
    event::{gunzip_json, into_s3_notifications, S3Notification},
    util::unquote_plus,
};
use aws_sdk_s3::{Client, Error};
use serde_json::Value;

/// Fetch every object referenced by the notification and decode it
/// with `handler`, preserving the notification order.
///
/// ```no_run
/// use support_cases_sync::{s3::get_s3_objects, RuntimeError, S3Notification};
///
/// async fn object_sizes(
///     client: &aws_sdk_s3::Client,
///     event: serde_json::Value,
/// ) -> Result<Vec<usize>, RuntimeError> {
///     let notification: S3Notification = serde_json::from_value(event)?;
///     get_s3_objects(client, &notification, |bytes| Ok(bytes.len())).await
/// }
/// ```
#[tracing::instrument(skip(client, notification, handler))]
pub async fn get_s3_objects<T, F>(
    client: &Client,
    notification: &S3Notification,
    handler: F,
) -> Result<Vec<T>, RuntimeError>
where
    F: Fn(&[u8]) -> Result<T, RuntimeError>,
{
    let mut objects = Vec::with_capacity(notification.records.len());

    for record in &notification.records {
        let bucket = &record.s3.bucket.name;
        let key = unquote_plus(&record.s3.object.key);
        tracing::info!(%bucket, %key, "fetching object");

        let output = client
            .get_object()
            .bucket(bucket)
            .key(&key)
            .send()
            .await
            .map_err(Error::from)?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|_| RuntimeError::ObjectBody {
                bucket: bucket.clone(),
                key: key.clone(),
            })?
            .into_bytes();

        objects.push(handler(&bytes)?);
    }

    Ok(objects)
}

/// Fetch the gzipped JSON objects referenced by a direct S3
/// notification or by an SNS delivery of S3 notifications.
pub async fn get_gzipped_s3_objects(
    client: &Client,
    event: Value,
) -> Result<Vec<Value>, RuntimeError> {
    let mut objects = Vec::new();
    for notification in into_s3_notifications(event)? {
        objects.extend(get_s3_objects(client, &notification, gunzip_json).await?);
    }
    Ok(objects)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::*;
    use aws_sdk_s3::{Client, Config};
    use aws_smithy_client::{erase::DynConnector, test_connection::TestConnection};
    use aws_smithy_http::body::SdkBody;
    use flate2::{write::GzEncoder, Compression};
    use serde_json::json;
    use std::io::Write;

    fn gzip(data: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    fn object_response(body: Vec<u8>) -> http::Response<SdkBody> {
        http::Response::builder()
            .status(200)
            .body(SdkBody::from(body))
            .unwrap()
    }

    fn s3_event() -> Value {
        json!({
            "Records": [
                {"s3": {"bucket": {"name": "trail"}, "object": {"key": "logs/first.json.gz"}}},
                {"s3": {"bucket": {"name": "trail"}, "object": {"key": "logs/second+file.json.gz"}}}
            ]
        })
    }

    fn get_object(path: &str) -> http::Request<SdkBody> {
        get_path_request_builder("s3", &format!("{path}?x-id=GetObject"))
            .body(SdkBody::from(""))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_gzipped_objects_from_s3_notification() -> Result<(), RuntimeError> {
        let conn = TestConnection::new(vec![
            (
                get_object("/trail/logs/first.json.gz"),
                object_response(gzip(r#"{"Records": [{"eventName": "CreateCase"}]}"#)),
            ),
            (
                get_object("/trail/logs/second%20file.json.gz"),
                object_response(gzip(r#"{"Records": []}"#)),
            ),
        ]);
        let config = Config::new(&get_mock_config().await);
        let client = Client::from_conf_conn(config, DynConnector::new(conn.clone()));

        let objects = get_gzipped_s3_objects(&client, s3_event()).await?;
        assert_eq!(
            vec![
                json!({"Records": [{"eventName": "CreateCase"}]}),
                json!({"Records": []})
            ],
            objects
        );
        conn.assert_requests_match(&vec![]);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_gzipped_objects_from_sns_message() -> Result<(), RuntimeError> {
        let conn = TestConnection::new(vec![
            (
                get_request_builder("s3").body(SdkBody::from("")).unwrap(),
                object_response(gzip(r#"{"Records": [{"eventName": "CreateCase"}]}"#)),
            ),
            (
                get_request_builder("s3").body(SdkBody::from("")).unwrap(),
                object_response(gzip(r#"{"Records": []}"#)),
            ),
        ]);
        let config = Config::new(&get_mock_config().await);
        let client = Client::from_conf_conn(config, DynConnector::new(conn.clone()));

        let event = json!({"Records": [{"Sns": {"Message": s3_event().to_string()}}]});
        let objects = get_gzipped_s3_objects(&client, event).await?;
        assert_eq!(2, objects.len());
        assert_eq!(json!({"Records": [{"eventName": "CreateCase"}]}), objects[0]);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_objects_with_custom_handler() -> Result<(), RuntimeError> {
        let conn = TestConnection::new(vec![(
            get_object("/trail/a%20b"),
            object_response(b"plain".to_vec()),
        )]);
        let config = Config::new(&get_mock_config().await);
        let client = Client::from_conf_conn(config, DynConnector::new(conn.clone()));

        let notification: S3Notification = serde_json::from_value(json!({
            "Records": [{"s3": {"bucket": {"name": "trail"}, "object": {"key": "a%20b"}}}]
        }))?;
        let lengths = get_s3_objects(&client, &notification, |bytes| Ok(bytes.len())).await?;
        assert_eq!(vec![5], lengths);
        // the unescaped key "a b" is what reaches S3
        conn.assert_requests_match(&vec![]);

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_object_is_an_error() {
        let conn = TestConnection::new(vec![(
            get_request_builder("s3").body(SdkBody::from("")).unwrap(),
            object_response(gzip("not json")),
        )]);
        let config = Config::new(&get_mock_config().await);
        let client = Client::from_conf_conn(config, DynConnector::new(conn));

        let event = json!({
            "Records": [{"s3": {"bucket": {"name": "trail"}, "object": {"key": "bad.json.gz"}}}]
        });
        let res = get_gzipped_s3_objects(&client, event).await;
        assert!(matches!(res, Err(RuntimeError::Json(_))));
    }
}
