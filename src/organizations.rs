use crate::error::RuntimeError;
use aws_sdk_organizations::{Client, Error};
use aws_smithy_types::retry::RetryConfig;
use aws_types::SdkConfig;

/// Attempts per ListAccounts page before giving up.
const MAX_ATTEMPTS: u32 = 8;

/// Organizations configuration that retries each page up to [`MAX_ATTEMPTS`] times.
pub fn organizations_config(config: &SdkConfig) -> aws_sdk_organizations::Config {
    aws_sdk_organizations::config::Builder::from(config)
        .retry_config(RetryConfig::new().with_max_attempts(MAX_ATTEMPTS))
        .build()
}

/// List the ids of every account in the organization.
///
/// Only the management account (or a role assumed in it) can list
/// accounts. Being denied is reported and yields an empty list.
#[tracing::instrument(skip(client))]
pub async fn list_account_ids(client: &Client) -> Result<Vec<String>, RuntimeError> {
    let mut account_ids = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let res = client
            .list_accounts()
            .set_next_token(next_token.take())
            .send()
            .await;

        let output = match res {
            Ok(output) => output,
            Err(sdk_err) => match Error::from(sdk_err) {
                Error::AccessDeniedException(err) => {
                    tracing::error!(error = %err, "could not call organizations:ListAccounts");
                    tracing::error!(
                        "current account is likely not the AWS Organizations master account, \
                         see README for more details on setup; returning empty list"
                    );
                    return Ok(Vec::new());
                }
                err => return Err(RuntimeError::Organizations(err)),
            },
        };

        account_ids.extend(
            output
                .accounts()
                .unwrap_or_default()
                .iter()
                .filter_map(|account| account.id().map(String::from)),
        );

        match output.next_token() {
            Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
            _ => break,
        }
    }

    tracing::info!(accounts = account_ids.len(), "listed organization accounts");
    Ok(account_ids)
}
