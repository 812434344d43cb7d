use crate::error::RuntimeError;
use aws_sdk_lambda::{model::InvocationType, types::Blob, Client, Error};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// `AggregationRequest` is the payload sent to the aggregator, one per account.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AggregationRequest {
    /// Account the cases were opened in
    pub account_id: String,
    /// Cases to refresh, without duplicates
    pub case_ids: Vec<String>,
}

/// Invoke the function as an event.
/// It does not wait for the invocation to run, only for Lambda to accept it.
#[tracing::instrument(skip(client, request), fields(account_id = %request.account_id))]
pub async fn invoke_event(
    client: &Client,
    function_name: &str,
    request: &AggregationRequest,
) -> Result<(), RuntimeError> {
    let payload = serde_json::to_vec(request)?;

    let response = client
        .invoke()
        .function_name(function_name)
        .invocation_type(InvocationType::Event)
        .payload(Blob::new(payload))
        .send()
        .await
        .map_err(Error::from)?;

    // 202 is the expected status code for Event invocations
    if response.status_code() != 202 {
        tracing::error!(
            status_code = response.status_code(),
            "invocation was not accepted"
        );
        return Err(RuntimeError::DispatchRejected {
            function: function_name.into(),
            status: response.status_code(),
        });
    }

    Ok(())
}

/// Send one aggregation request per account with at least one case.
#[tracing::instrument(skip(client, cases))]
pub async fn dispatch_aggregations(
    client: &Client,
    function_name: &str,
    cases: BTreeMap<String, BTreeSet<String>>,
) -> Result<usize, RuntimeError> {
    let mut dispatched = 0;

    for (account_id, case_ids) in cases {
        if case_ids.is_empty() {
            continue;
        }
        let request = AggregationRequest {
            account_id,
            case_ids: case_ids.into_iter().collect(),
        };
        invoke_event(client, function_name, &request).await?;
        dispatched += 1;
    }

    tracing::info!(dispatched, "aggregations dispatched");
    Ok(dispatched)
}
