use crate::{
    conf::Settings,
    dispatch::AggregationRequest,
    dynamodb::DynamoDBClient,
    error::RuntimeError,
    organizations::{list_account_ids, organizations_config},
    sts::SessionProvider,
    support::{support_config, sync_case_ids, update_all_cases, update_recent_cases},
    trigger::Trigger,
};
use aws_sdk_organizations::Client as OrganizationsClient;
use aws_sdk_support::Client as SupportClient;
use aws_types::SdkConfig;

/// Session name used in member accounts.
const SUPPORT_SESSION_NAME: &str = "get_support_info";

/// Session name used in the organization's management account.
const LIST_ACCOUNTS_SESSION_NAME: &str = "listAccountIds";

/// `Aggregator` keeps the support cases table in sync with the
/// Support API of every member account.
pub struct Aggregator {
    config: SdkConfig,
    sessions: SessionProvider,
    store: DynamoDBClient,
    settings: Settings,
    #[cfg(test)]
    connector: Option<aws_smithy_client::erase::DynConnector>,
}

impl Aggregator {
    /// Build an aggregator on top of the function's own credentials.
    pub async fn new(config: SdkConfig, settings: Settings) -> Result<Aggregator, RuntimeError> {
        let sessions = SessionProvider::new(&config);
        let store = DynamoDBClient::new(&config, settings.table_name()?).await;
        Ok(Aggregator {
            config,
            sessions,
            store,
            settings,
            #[cfg(test)]
            connector: None,
        })
    }

    /// Organizations and Support clients built by this aggregator go
    /// through `connector`.
    #[cfg(test)]
    pub(crate) fn from_parts(
        config: SdkConfig,
        sessions: SessionProvider,
        store: DynamoDBClient,
        settings: Settings,
        connector: aws_smithy_client::erase::DynConnector,
    ) -> Aggregator {
        Aggregator {
            config,
            sessions,
            store,
            settings,
            connector: Some(connector),
        }
    }

    /// Run the work described by the trigger.
    #[tracing::instrument(skip(self))]
    pub async fn handle(&self, trigger: Trigger) -> Result<bool, RuntimeError> {
        match trigger {
            Trigger::RecentCases => {
                tracing::info!("invocation to ensure support info is up-to-date");
                self.sync_all_accounts(true).await
            }
            Trigger::AllCases => {
                tracing::info!("invocation to reload every support case");
                self.sync_all_accounts(false).await
            }
            Trigger::Cases(request) => self.sync_account_cases(&request).await,
        }
    }

    /// Refresh the cases named in the request.
    pub async fn sync_account_cases(
        &self,
        request: &AggregationRequest,
    ) -> Result<bool, RuntimeError> {
        let client = self.support_client_for(&request.account_id).await?;
        sync_case_ids(&client, &self.store, &request.account_id, &request.case_ids).await
    }

    /// Refresh the cases of every account in the organization.
    pub async fn sync_all_accounts(&self, recent_cases_only: bool) -> Result<bool, RuntimeError> {
        for account_id in self.list_account_ids().await? {
            let client = self.support_client_for(&account_id).await?;
            if recent_cases_only {
                update_recent_cases(
                    &client,
                    &self.store,
                    &account_id,
                    self.settings.case_lookback_days,
                )
                .await?;
            } else {
                update_all_cases(&client, &self.store, &account_id).await?;
            }
        }
        Ok(true)
    }

    /// List the organization's accounts, from the management account
    /// role when one is configured.
    pub async fn list_account_ids(&self) -> Result<Vec<String>, RuntimeError> {
        let client = match &self.settings.org_master_account_viewer_role {
            Some(role_arn) => {
                let config = self
                    .sessions
                    .assume_role_with_arn(role_arn, LIST_ACCOUNTS_SESSION_NAME)
                    .await?;
                self.organizations_client(&config)
            }
            None => self.organizations_client(&self.config),
        };
        list_account_ids(&client).await
    }

    async fn support_client_for(&self, account_id: &str) -> Result<SupportClient, RuntimeError> {
        let config = self
            .sessions
            .assume_role(
                account_id,
                &self.settings.org_support_viewer_role,
                SUPPORT_SESSION_NAME,
            )
            .await?;
        Ok(self.support_client(&config))
    }

    #[cfg(not(test))]
    fn organizations_client(&self, config: &SdkConfig) -> OrganizationsClient {
        OrganizationsClient::from_conf(organizations_config(config))
    }

    #[cfg(test)]
    fn organizations_client(&self, config: &SdkConfig) -> OrganizationsClient {
        match &self.connector {
            Some(conn) => {
                OrganizationsClient::from_conf_conn(organizations_config(config), conn.clone())
            }
            None => OrganizationsClient::from_conf(organizations_config(config)),
        }
    }

    #[cfg(not(test))]
    fn support_client(&self, config: &SdkConfig) -> SupportClient {
        SupportClient::from_conf(support_config(config))
    }

    #[cfg(test)]
    fn support_client(&self, config: &SdkConfig) -> SupportClient {
        match &self.connector {
            Some(conn) => SupportClient::from_conf_conn(support_config(config), conn.clone()),
            None => SupportClient::from_conf(support_config(config)),
        }
    }
}
