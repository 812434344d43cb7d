use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// CloudTrail event names that change the state of a support case.
/// `AddCommunicationToCase` covers cases being reopened.
pub const SUPPORT_CASE_EVENTS: [&str; 3] = ["CreateCase", "ResolveCase", "AddCommunicationToCase"];

/// `CloudTrailLog` is the content of one CloudTrail log file
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CloudTrailLog {
    /// Activity entries in the file
    #[serde(rename = "Records", default)]
    pub records: Vec<CloudTrailRecord>,
}

/// `CloudTrailRecord` is a single API activity entry
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CloudTrailRecord {
    /// Account the API call was made in
    #[serde(default)]
    pub recipient_account_id: Option<String>,
    /// API operation name
    #[serde(default)]
    pub event_name: Option<String>,
    /// Parameters of the API request
    #[serde(default)]
    pub request_parameters: Option<Value>,
    /// Elements of the API response
    #[serde(default)]
    pub response_elements: Option<Value>,
}

impl CloudTrailRecord {
    fn is_support_case_event(&self) -> bool {
        self.event_name
            .as_deref()
            .map(|name| SUPPORT_CASE_EVENTS.contains(&name))
            .unwrap_or(false)
    }

    /// The case id, read from the response first and the request second.
    pub fn case_id(&self) -> Option<&str> {
        case_id_in(&self.response_elements).or_else(|| case_id_in(&self.request_parameters))
    }
}

fn case_id_in(elements: &Option<Value>) -> Option<&str> {
    elements
        .as_ref()
        .and_then(|e| e.get("caseId"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Group the support cases touched in the given logs by account.
pub fn support_cases_by_account<'a, I>(logs: I) -> BTreeMap<String, BTreeSet<String>>
where
    I: IntoIterator<Item = &'a CloudTrailLog>,
{
    let mut cases: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for record in logs.into_iter().flat_map(|log| &log.records) {
        if !record.is_support_case_event() {
            continue;
        }
        let event_name = record.event_name.as_deref().unwrap_or_default();

        let account_id = match record.recipient_account_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => {
                tracing::error!(event_name, ?record, "support case event without account id");
                continue;
            }
        };

        match record.case_id() {
            Some(case_id) => {
                tracing::info!(account_id, case_id, event_name, "support case found");
                cases
                    .entry(account_id.to_string())
                    .or_default()
                    .insert(case_id.to_string());
            }
            None => {
                tracing::error!(
                    account_id,
                    event_name,
                    ?record,
                    "CaseIdMissingError: support case event without caseId"
                );
            }
        }
    }

    cases
}
