use crate::{error::RuntimeError, util::truncate_to_limit};
use aws_sdk_sts::{Client, Error};
use aws_types::{region::Region, Credentials, SdkConfig};

/// Session name used when the caller doesn't provide one.
pub const DEFAULT_SESSION_NAME: &str = "aws_common_utils";

/// STS rejects role session names longer than this.
pub const SESSION_NAME_MAX_LENGTH: usize = 64;

/// Comply with the role session name limit, logging when the name is cut.
pub fn handle_session_name_length(session_name: &str) -> &str {
    let truncated = truncate_to_limit(session_name, SESSION_NAME_MAX_LENGTH);
    if truncated.len() < session_name.len() {
        tracing::info!(
            "session name was too long; truncating to {}",
            SESSION_NAME_MAX_LENGTH
        );
    }
    truncated
}

/// Build the ARN of a role in another account.
pub fn role_arn(account_id: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{account_id}:role/{role_name}")
}

/// `SessionProvider` assumes roles on top of a base configuration.
/// The base configuration holds the credentials allowed to assume
/// those roles, usually the function's own.
pub struct SessionProvider {
    client: Client,
    region: Option<Region>,
}

impl SessionProvider {
    /// Build a provider that assumes roles with the credentials in `base`.
    pub fn new(base: &SdkConfig) -> SessionProvider {
        SessionProvider {
            client: Client::new(base),
            region: base.region().cloned(),
        }
    }

    /// Build a provider from the ambient credentials of the process.
    pub async fn from_env() -> SessionProvider {
        let config = aws_config::load_from_env().await;
        SessionProvider::new(&config)
    }

    #[cfg(test)]
    pub(crate) fn from_client(client: Client, base: &SdkConfig) -> SessionProvider {
        SessionProvider {
            client,
            region: base.region().cloned(),
        }
    }

    /// Assume a new role to perform operations in a different account.
    /// Failures are logged with the role arn and returned to the caller.
    #[tracing::instrument(skip(self))]
    pub async fn assume_role_with_arn(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<SdkConfig, RuntimeError> {
        let session_name = if session_name.is_empty() {
            DEFAULT_SESSION_NAME
        } else {
            handle_session_name_length(session_name)
        };

        tracing::info!("assuming new role");

        let assumed_role = match self
            .client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
        {
            Ok(output) => output,
            Err(sdk_err) => {
                let err = Error::from(sdk_err);
                tracing::error!(role_arn, error = %err, "failed to assume role");
                return Err(RuntimeError::AssumeRoleFailure(err));
            }
        };

        let credentials = match assumed_role.credentials {
            Some(creds) => creds,
            None => {
                tracing::error!(role_arn, "assume role response has no credentials");
                return Err(RuntimeError::MissingCredentials);
            }
        };

        let (access_key_id, secret_access_key) =
            match (credentials.access_key_id(), credentials.secret_access_key()) {
                (Some(id), Some(key)) => (id, key),
                _ => {
                    tracing::error!(role_arn, "assumed credentials are missing their keys");
                    return Err(RuntimeError::MissingCredentials);
                }
            };

        let assumed_credentials = Credentials::from_keys(
            access_key_id,
            secret_access_key,
            credentials.session_token.clone(),
        );

        // keep the base region so regional clients still resolve an endpoint
        let mut loader = aws_config::from_env().credentials_provider(assumed_credentials);
        if let Some(region) = self.region.clone() {
            loader = loader.region(region);
        }
        let new_config = loader.load().await;

        Ok(new_config)
    }

    /// Assume `role_name` in `account_id`.
    pub async fn assume_role(
        &self,
        account_id: &str,
        role_name: &str,
        session_name: &str,
    ) -> Result<SdkConfig, RuntimeError> {
        self.assume_role_with_arn(&role_arn(account_id, role_name), session_name)
            .await
    }
}
