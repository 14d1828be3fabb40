use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use voxy_core::config::{AppConfig, ConfigError, LoadOptions};
use voxy_crm::{CrmClient, CrmError, RestCrmClient};
use voxy_voice::{default_router, IntentRouter, SessionHooks};

pub struct Application {
    pub config: AppConfig,
    pub router: IntentRouter,
    pub hooks: SessionHooks,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("crm client construction failed: {0}")]
    Crm(#[source] CrmError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let client = RestCrmClient::from_config(&config.crm).map_err(BootstrapError::Crm)?;
    info!(
        event_name = "system.bootstrap.crm_client_ready",
        correlation_id = "bootstrap",
        login_url = %config.crm.login_url,
        "crm client constructed"
    );

    Ok(application_with_client(config, Arc::new(client)))
}

/// Wires the intent table around any client implementation. Tests drive this
/// with the in-memory fixture client.
pub fn application_with_client(config: AppConfig, client: Arc<dyn CrmClient>) -> Application {
    let router = default_router(client, config.voice.timezone);
    info!(
        event_name = "system.bootstrap.router_ready",
        correlation_id = "bootstrap",
        handler_count = router.handler_count(),
        "intent router populated"
    );

    Application { config, router, hooks: SessionHooks }
}

#[cfg(test)]
mod tests {
    use voxy_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    #[test]
    fn bootstrap_fails_fast_without_crm_credentials() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                crm_client_id: Some("consumer-key".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().expect("error").to_string();
        assert!(message.contains("crm.client_secret"));
    }

    #[test]
    fn bootstrap_builds_the_full_intent_table() {
        let app = bootstrap(LoadOptions {
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
        .expect("bootstrap");

        assert_eq!(app.router.handler_count(), 10);
    }
}
