use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;
use voxy_core::config::CrmConfig;

use crate::client::{CrmClient, CrmError, CrmOperation};
use crate::record::{InsertOutcome, NewRecord, Record, RecordSet};
use crate::soql::Soql;

/// REST adapter for the CRM org: username-password OAuth token exchange plus
/// the JSON query/insert endpoints. Constructed once at bootstrap and shared
/// across all requests via `Arc`; the token session is cached after the first
/// successful authenticate and reused read-only (no teardown needed).
pub struct RestCrmClient {
    http: Client,
    config: CrmConfig,
    session: RwLock<Option<ApiSession>>,
}

#[derive(Clone, Debug)]
struct ApiSession {
    access_token: String,
    instance_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    records: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct InsertResponse {
    success: bool,
    #[serde(default)]
    id: Option<String>,
}

impl RestCrmClient {
    pub fn from_config(config: &CrmConfig) -> Result<Self, CrmError> {
        if config.client_id.trim().is_empty() || config.username.trim().is_empty() {
            return Err(CrmError::NotConfigured(
                "crm client id and username must be present".to_owned(),
            ));
        }

        Ok(Self { http: Client::new(), config: config.clone(), session: RwLock::new(None) })
    }

    async fn cached_session(&self, operation: CrmOperation) -> Result<ApiSession, CrmError> {
        self.session.read().await.clone().ok_or_else(|| {
            CrmError::remote(operation, "no authenticated session; call authenticate first")
        })
    }

    fn data_url(&self, session: &ApiSession, suffix: &str) -> String {
        format!(
            "{}/services/data/v{}/{suffix}",
            session.instance_url.trim_end_matches('/'),
            self.config.api_version
        )
    }
}

#[async_trait::async_trait]
impl CrmClient for RestCrmClient {
    async fn authenticate(&self) -> Result<(), CrmError> {
        if self.session.read().await.is_some() {
            return Ok(());
        }

        let token_url =
            format!("{}/services/oauth2/token", self.config.login_url.trim_end_matches('/'));
        let form = [
            ("grant_type", "password"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("username", self.config.username.as_str()),
            ("password", self.config.password.expose_secret()),
            ("redirect_uri", self.config.callback_url.as_str()),
        ];

        let response = self
            .http
            .post(&token_url)
            .form(&form)
            .send()
            .await
            .map_err(|err| CrmError::remote(CrmOperation::Authenticate, err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CrmError::remote(
                CrmOperation::Authenticate,
                format!("token endpoint returned {status}: {body}"),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| CrmError::remote(CrmOperation::Authenticate, err.to_string()))?;

        debug!(
            event_name = "crm.authenticated",
            instance_url = %token.instance_url,
            "crm session established"
        );

        *self.session.write().await =
            Some(ApiSession { access_token: token.access_token, instance_url: token.instance_url });

        Ok(())
    }

    async fn query(&self, soql: &Soql) -> Result<RecordSet, CrmError> {
        let session = self.cached_session(CrmOperation::Query).await?;
        let url = self.data_url(&session, "query");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&session.access_token)
            .query(&[("q", soql.to_query_string())])
            .send()
            .await
            .map_err(|err| CrmError::remote(CrmOperation::Query, err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CrmError::remote(
                CrmOperation::Query,
                format!("query endpoint returned {status}: {body}"),
            ));
        }

        let payload: QueryResponse = response
            .json()
            .await
            .map_err(|err| CrmError::remote(CrmOperation::Query, err.to_string()))?;

        Ok(RecordSet::new(payload.records.iter().map(Record::from_value).collect()))
    }

    async fn insert(&self, record: NewRecord) -> Result<InsertOutcome, CrmError> {
        let session = self.cached_session(CrmOperation::Insert).await?;
        let url = self.data_url(&session, &format!("sobjects/{}", record.object()));

        let response = self
            .http
            .post(&url)
            .bearer_auth(&session.access_token)
            .json(&record.to_body())
            .send()
            .await
            .map_err(|err| CrmError::remote(CrmOperation::Insert, err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CrmError::remote(
                CrmOperation::Insert,
                format!("sobject endpoint returned {status}: {body}"),
            ));
        }

        let payload: InsertResponse = response
            .json()
            .await
            .map_err(|err| CrmError::remote(CrmOperation::Insert, err.to_string()))?;

        Ok(InsertOutcome { success: payload.success, id: payload.id })
    }
}

#[cfg(test)]
mod tests {
    use voxy_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use super::RestCrmClient;
    use crate::client::{CrmClient, CrmError, CrmOperation};
    use crate::soql::Soql;

    fn crm_config() -> voxy_core::config::CrmConfig {
        AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                crm_client_id: Some("consumer-key".to_string()),
                crm_client_secret: Some("consumer-secret".to_string()),
                crm_username: Some("voxy@example.com".to_string()),
                crm_password: Some("hunter2".to_string()),
                crm_callback_url: Some("https://example.com/oauth/callback".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("config")
        .crm
    }

    #[test]
    fn from_config_rejects_blank_identity() {
        let mut config = crm_config();
        config.client_id = String::new();

        assert!(matches!(
            RestCrmClient::from_config(&config),
            Err(CrmError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn query_before_authenticate_is_a_remote_failure() {
        let client = RestCrmClient::from_config(&crm_config()).expect("client");
        let soql = Soql::select(["Name"]).from("Lead").and_raw("CreatedDate = TODAY");

        let err = client.query(&soql).await.err().expect("error");
        assert!(matches!(err, CrmError::Remote { operation: CrmOperation::Query, .. }));
    }
}
