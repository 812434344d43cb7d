//! Configuration as read from the environment.

use crate::error::RuntimeError;
use serde::Deserialize;

/// Role assumed in each member account to read its support cases.
fn default_org_support_viewer_role() -> String {
    String::from("GetSupportInfoRole")
}

/// Window used by the periodic sync, in days.
fn default_case_lookback_days() -> i64 {
    60
}

/// Both functions are configured through environment variables. Each
/// binary only requires the subset it uses, so presence is checked
/// through the accessors below rather than at parse time.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Settings {
    /// Name of the function invoked once per account by the trigger.
    #[serde(default)]
    pub support_cases_aggregator_lambda_name: Option<String>,

    /// DynamoDB table holding one item per support case.
    #[serde(default)]
    pub support_cases_table_name: Option<String>,

    /// Role in the organization's management account allowed to list
    /// accounts. When omitted, accounts are listed with the function's
    /// own credentials.
    #[serde(default)]
    pub org_master_account_viewer_role: Option<String>,

    /// Name of the role assumed in member accounts.
    #[serde(default = "default_org_support_viewer_role")]
    pub org_support_viewer_role: String,

    /// How far back the periodic sync looks for updated cases.
    #[serde(default = "default_case_lookback_days")]
    pub case_lookback_days: i64,

    /// One of INFO, ERROR, WARNING, DEBUG or CRITICAL.
    #[serde(default)]
    pub logging_level: Option<String>,
}

impl Settings {
    /// Read the settings from the process environment.
    pub fn from_env() -> Result<Settings, RuntimeError> {
        Ok(envy::from_env()?)
    }

    /// Name of the aggregator function, required by the trigger.
    pub fn aggregator_function(&self) -> Result<&str, RuntimeError> {
        self.support_cases_aggregator_lambda_name
            .as_deref()
            .ok_or(RuntimeError::MissingSetting(
                "SUPPORT_CASES_AGGREGATOR_LAMBDA_NAME",
            ))
    }

    /// Name of the support cases table, required by the aggregator.
    pub fn table_name(&self) -> Result<&str, RuntimeError> {
        self.support_cases_table_name
            .as_deref()
            .ok_or(RuntimeError::MissingSetting("SUPPORT_CASES_TABLE_NAME"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings: Settings =
            envy::from_iter(vec![("SUPPORT_CASES_TABLE_NAME".to_string(), "cases".to_string())])
                .expect("failed to parse settings");

        assert_eq!(Some("cases".to_string()), settings.support_cases_table_name);
        assert_eq!("GetSupportInfoRole", settings.org_support_viewer_role);
        assert_eq!(60, settings.case_lookback_days);
        assert_eq!(None, settings.org_master_account_viewer_role);
        assert_eq!(None, settings.logging_level);
        assert_eq!("cases", settings.table_name().unwrap());
    }

    #[test]
    fn test_missing_aggregator_function() {
        let settings: Settings = envy::from_iter(vec![
            ("LOGGING_LEVEL".to_string(), "DEBUG".to_string()),
            ("CASE_LOOKBACK_DAYS".to_string(), "14".to_string()),
        ])
        .expect("failed to parse settings");

        assert_eq!(14, settings.case_lookback_days);
        assert!(matches!(
            settings.aggregator_function(),
            Err(RuntimeError::MissingSetting(
                "SUPPORT_CASES_AGGREGATOR_LAMBDA_NAME"
            ))
        ));
    }
}
