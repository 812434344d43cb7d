//! Defines a _trigger_, the work requested from the aggregator. The
//! trigger is built from the raw invocation payload.

use crate::{dispatch::AggregationRequest, error::RuntimeError};
use serde_json::Value;

/// What an aggregator invocation has to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Trigger {
    /// Refresh recently updated cases in every account.
    /// Sent by the schedule (`"source": "aws.events"`) or by hand (`ManualUpdate`).
    RecentCases,
    /// Refresh every case ever opened in every account (`FullSync`).
    AllCases,
    /// Refresh specific cases of one account, sent by the CloudTrail processor.
    Cases(AggregationRequest),
}

impl Trigger {
    /// Work out the trigger from an invocation payload.
    pub fn from_payload(payload: Value) -> Result<Self, RuntimeError> {
        if payload.get("source").and_then(Value::as_str) == Some("aws.events")
            || payload.get("ManualUpdate").is_some()
        {
            return Ok(Trigger::RecentCases);
        }
        if payload.get("FullSync").is_some() {
            return Ok(Trigger::AllCases);
        }
        if payload.get("AccountId").is_some() {
            return Ok(Trigger::Cases(serde_json::from_value(payload)?));
        }
        Err(RuntimeError::UnknownTrigger)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scheduled_event() {
        let payload = json!({
            "version": "0",
            "source": "aws.events",
            "detail-type": "Scheduled Event",
            "detail": {}
        });
        assert_eq!(Trigger::RecentCases, Trigger::from_payload(payload).unwrap());
    }

    #[test]
    fn test_manual_update() {
        let payload = json!({"ManualUpdate": true});
        assert_eq!(Trigger::RecentCases, Trigger::from_payload(payload).unwrap());
    }

    #[test]
    fn test_full_sync() {
        let payload = json!({"FullSync": true});
        assert_eq!(Trigger::AllCases, Trigger::from_payload(payload).unwrap());
    }

    #[test]
    fn test_cases() {
        let payload = json!({"AccountId": "111111111111", "CaseIds": ["case-1", "case-2"]});
        assert_eq!(
            Trigger::Cases(AggregationRequest {
                account_id: "111111111111".into(),
                case_ids: vec!["case-1".into(), "case-2".into()],
            }),
            Trigger::from_payload(payload).unwrap()
        );
    }

    #[test]
    fn test_unknown_payload() {
        assert!(matches!(
            Trigger::from_payload(json!({"source": "aws.s3"})),
            Err(RuntimeError::UnknownTrigger)
        ));
        assert!(matches!(
            Trigger::from_payload(json!({"AccountId": "111111111111"})),
            Err(RuntimeError::Json(_))
        ));
    }
}
