//! Linked accounts, integrations and license keys
//!
//! Typed operations over [`NerdGraph::execute`]. Lookups are linear
//! first-match by name or service slug; the lists involved are small.

use crate::error::{NewRelicError, Result};
use crate::nerdgraph::{NerdGraph, check_operation_errors};
use serde::Deserialize;
use serde_json::{Value, json};

/// Service slug of the Lambda cloud integration.
pub const LAMBDA_SERVICE_SLUG: &str = "lambda";

/// A cloud account linked to a New Relic account.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkedAccount {
    pub id: i64,
    pub name: String,
    #[serde(rename = "authLabel")]
    pub auth_label: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<i64>,
    /// AWS account id recorded at link time; expected to match the
    /// caller's current credentials.
    #[serde(rename = "externalId")]
    pub external_id: Option<String>,
}

/// A cloud integration enabled on a linked account.
#[derive(Debug, Clone, Deserialize)]
pub struct Integration {
    pub id: i64,
    pub name: Option<String>,
    pub service: IntegrationService,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationService {
    pub slug: String,
}

const LICENSE_KEY_QUERY: &str = "\
query ($accountId: Int!) {
  actor { account(id: $accountId) { licenseKey } }
}";

const LINKED_ACCOUNTS_QUERY: &str = "\
query ($accountId: Int!) {
  actor { account(id: $accountId) { cloud { linkedAccounts {
    id name authLabel createdAt externalId
  } } } }
}";

const INTEGRATIONS_QUERY: &str = "\
query ($accountId: Int!, $linkedAccountId: Int!) {
  actor { account(id: $accountId) { cloud { linkedAccount(id: $linkedAccountId) {
    integrations { id name service { slug } }
  } } } }
}";

const LINK_ACCOUNT_MUTATION: &str = "\
mutation ($accountId: Int!, $name: String!, $arn: String!) {
  cloudLinkAccount(accountId: $accountId, accounts: { aws: [{ name: $name, arn: $arn }] }) {
    linkedAccounts { id name authLabel createdAt externalId }
    errors { type message }
  }
}";

const ENABLE_LAMBDA_MUTATION: &str = "\
mutation ($accountId: Int!, $linkedAccountId: Int!) {
  cloudConfigureIntegration(
    accountId: $accountId,
    integrations: { aws: { lambda: [{ linkedAccountId: $linkedAccountId }] } }
  ) {
    integrations { id name service { slug } }
    errors { type message }
  }
}";

impl NerdGraph {
    /// License key of a New Relic account, used as the ingestion stack
    /// parameter. Prints remediation guidance for the two common
    /// credential mistakes before passing the error up.
    pub async fn get_license_key(&self, account_id: i64) -> Result<String> {
        let data = match self
            .execute(LICENSE_KEY_QUERY, json!({ "accountId": account_id }))
            .await
        {
            Err(NewRelicError::Unauthorized(status)) => {
                eprintln!(
                    "The API key was not accepted. Make sure you pass a User API key \
                     (it starts with \"NRAK\"). See \
                     https://docs.newrelic.com/docs/apis/intro-apis/new-relic-api-keys/"
                );
                return Err(NewRelicError::Unauthorized(status));
            }
            Err(NewRelicError::Api(message)) if is_access_denied(&message) => {
                eprintln!(
                    "Access was denied for account {account_id}. Double-check the \
                     New Relic account id and that your API key belongs to it."
                );
                return Err(NewRelicError::Api(message));
            }
            other => other?,
        };

        data.pointer("/actor/account/licenseKey")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| NewRelicError::MalformedResponse(data.to_string()))
    }

    /// All cloud accounts linked to a New Relic account.
    pub async fn get_linked_accounts(&self, account_id: i64) -> Result<Vec<LinkedAccount>> {
        let data = self
            .execute(LINKED_ACCOUNTS_QUERY, json!({ "accountId": account_id }))
            .await?;

        match data.pointer("/actor/account/cloud/linkedAccounts") {
            Some(accounts) if !accounts.is_null() => Ok(serde_json::from_value(accounts.clone())?),
            _ => Ok(Vec::new()),
        }
    }

    /// First linked account with the given display name, if any. Name
    /// uniqueness is not enforced remotely; first listed wins.
    pub async fn find_linked_account(
        &self,
        account_id: i64,
        name: &str,
    ) -> Result<Option<LinkedAccount>> {
        let accounts = self.get_linked_accounts(account_id).await?;
        Ok(accounts.into_iter().find(|a| a.name == name))
    }

    /// Link an AWS account through its integration role ARN.
    pub async fn link_account(
        &self,
        account_id: i64,
        name: &str,
        role_arn: &str,
    ) -> Result<LinkedAccount> {
        let data = self
            .execute(
                LINK_ACCOUNT_MUTATION,
                json!({ "accountId": account_id, "name": name, "arn": role_arn }),
            )
            .await?;

        let payload = data
            .get("cloudLinkAccount")
            .ok_or_else(|| NewRelicError::MalformedResponse(data.to_string()))?;
        check_operation_errors(payload)?;

        let accounts: Vec<LinkedAccount> = match payload.get("linkedAccounts") {
            Some(accounts) => serde_json::from_value(accounts.clone())?,
            None => Vec::new(),
        };
        accounts
            .into_iter()
            .find(|a| a.name == name)
            .ok_or_else(|| NewRelicError::MalformedResponse(payload.to_string()))
    }

    /// Integrations enabled on a linked account. An unknown linked
    /// account yields an empty list rather than an error.
    pub async fn get_integrations(
        &self,
        account_id: i64,
        linked_account_id: i64,
    ) -> Result<Vec<Integration>> {
        let data = self
            .execute(
                INTEGRATIONS_QUERY,
                json!({ "accountId": account_id, "linkedAccountId": linked_account_id }),
            )
            .await?;

        match data.pointer("/actor/account/cloud/linkedAccount/integrations") {
            Some(integrations) if !integrations.is_null() => {
                Ok(serde_json::from_value(integrations.clone())?)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Whether the Lambda integration is enabled; derived from the
    /// integration list, with "not found" meaning "not enabled".
    pub async fn is_lambda_integration_enabled(
        &self,
        account_id: i64,
        linked_account_id: i64,
    ) -> Result<bool> {
        let integrations = self.get_integrations(account_id, linked_account_id).await?;
        Ok(integrations
            .iter()
            .any(|i| i.service.slug == LAMBDA_SERVICE_SLUG))
    }

    /// Enable the Lambda integration and return the resulting
    /// integration records.
    pub async fn enable_lambda_integration(
        &self,
        account_id: i64,
        linked_account_id: i64,
    ) -> Result<Vec<Integration>> {
        let data = self
            .execute(
                ENABLE_LAMBDA_MUTATION,
                json!({ "accountId": account_id, "linkedAccountId": linked_account_id }),
            )
            .await?;

        let payload = data
            .get("cloudConfigureIntegration")
            .ok_or_else(|| NewRelicError::MalformedResponse(data.to_string()))?;
        check_operation_errors(payload)?;

        match payload.get("integrations") {
            Some(integrations) => Ok(serde_json::from_value(integrations.clone())?),
            None => Ok(Vec::new()),
        }
    }
}

fn is_access_denied(message: &str) -> bool {
    message.to_ascii_lowercase().contains("access denied")
}
