use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub crm: CrmConfig,
    pub voice: VoiceConfig,
    pub logging: LoggingConfig,
}

/// Credentials and endpoints for the remote CRM org. Secret material is
/// never stored as plain `String` so it cannot leak through Debug output.
#[derive(Clone, Debug)]
pub struct CrmConfig {
    pub login_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub username: String,
    pub password: SecretString,
    pub callback_url: String,
    pub api_version: String,
}

#[derive(Clone, Debug)]
pub struct VoiceConfig {
    /// IANA timezone used when speaking calendar times.
    pub timezone: Tz,
    /// When set, inbound events carrying a different application id are
    /// rejected at dispatch.
    pub app_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub crm_login_url: Option<String>,
    pub crm_client_id: Option<String>,
    pub crm_client_secret: Option<String>,
    pub crm_username: Option<String>,
    pub crm_password: Option<String>,
    pub crm_callback_url: Option<String>,
    pub crm_api_version: Option<String>,
    pub voice_timezone: Option<String>,
    pub voice_app_id: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            crm: CrmConfig {
                login_url: "https://login.salesforce.com".to_string(),
                client_id: String::new(),
                client_secret: String::new().into(),
                username: String::new(),
                password: String::new().into(),
                callback_url: String::new(),
                api_version: "59.0".to_string(),
            },
            voice: VoiceConfig { timezone: chrono_tz::America::Los_Angeles, app_id: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

fn parse_timezone(value: &str) -> Result<Tz, ConfigError> {
    value.trim().parse::<Tz>().map_err(|_| {
        ConfigError::Validation(format!(
            "voice.timezone `{value}` is not a known IANA timezone name"
        ))
    })
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("voxy.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides)?;
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(crm) = patch.crm {
            if let Some(login_url) = crm.login_url {
                self.crm.login_url = login_url;
            }
            if let Some(client_id) = crm.client_id {
                self.crm.client_id = client_id;
            }
            if let Some(client_secret_value) = crm.client_secret {
                self.crm.client_secret = secret_value(client_secret_value);
            }
            if let Some(username) = crm.username {
                self.crm.username = username;
            }
            if let Some(password_value) = crm.password {
                self.crm.password = secret_value(password_value);
            }
            if let Some(callback_url) = crm.callback_url {
                self.crm.callback_url = callback_url;
            }
            if let Some(api_version) = crm.api_version {
                self.crm.api_version = api_version;
            }
        }

        if let Some(voice) = patch.voice {
            if let Some(timezone) = voice.timezone {
                self.voice.timezone = parse_timezone(&timezone)?;
            }
            if let Some(app_id) = voice.app_id {
                self.voice.app_id = Some(app_id);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("VOXY_CRM_LOGIN_URL") {
            self.crm.login_url = value;
        }
        if let Some(value) = read_env("VOXY_CRM_CLIENT_ID") {
            self.crm.client_id = value;
        }
        if let Some(value) = read_env("VOXY_CRM_CLIENT_SECRET") {
            self.crm.client_secret = secret_value(value);
        }
        if let Some(value) = read_env("VOXY_CRM_USERNAME") {
            self.crm.username = value;
        }
        if let Some(value) = read_env("VOXY_CRM_PASSWORD") {
            self.crm.password = secret_value(value);
        }
        if let Some(value) = read_env("VOXY_CRM_CALLBACK_URL") {
            self.crm.callback_url = value;
        }
        if let Some(value) = read_env("VOXY_CRM_API_VERSION") {
            self.crm.api_version = value;
        }

        if let Some(value) = read_env("VOXY_VOICE_TIMEZONE") {
            self.voice.timezone = parse_timezone(&value)?;
        }
        if let Some(value) = read_env("VOXY_VOICE_APP_ID") {
            self.voice.app_id = Some(value);
        }

        let log_level = read_env("VOXY_LOGGING_LEVEL").or_else(|| read_env("VOXY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("VOXY_LOGGING_FORMAT").or_else(|| read_env("VOXY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(login_url) = overrides.crm_login_url {
            self.crm.login_url = login_url;
        }
        if let Some(client_id) = overrides.crm_client_id {
            self.crm.client_id = client_id;
        }
        if let Some(client_secret) = overrides.crm_client_secret {
            self.crm.client_secret = secret_value(client_secret);
        }
        if let Some(username) = overrides.crm_username {
            self.crm.username = username;
        }
        if let Some(password) = overrides.crm_password {
            self.crm.password = secret_value(password);
        }
        if let Some(callback_url) = overrides.crm_callback_url {
            self.crm.callback_url = callback_url;
        }
        if let Some(api_version) = overrides.crm_api_version {
            self.crm.api_version = api_version;
        }
        if let Some(timezone) = overrides.voice_timezone {
            self.voice.timezone = parse_timezone(&timezone)?;
        }
        if let Some(app_id) = overrides.voice_app_id {
            self.voice.app_id = Some(app_id);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_crm(&self.crm)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("voxy.toml"), PathBuf::from("config/voxy.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_crm(crm: &CrmConfig) -> Result<(), ConfigError> {
    if !crm.login_url.starts_with("http://") && !crm.login_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "crm.login_url must start with http:// or https://".to_string(),
        ));
    }

    if crm.client_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crm.client_id is required. Use the consumer key of the org's connected app"
                .to_string(),
        ));
    }
    if crm.client_secret.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "crm.client_secret is required. Use the consumer secret of the org's connected app"
                .to_string(),
        ));
    }
    if crm.username.trim().is_empty() {
        return Err(ConfigError::Validation("crm.username is required".to_string()));
    }
    if crm.password.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation("crm.password is required".to_string()));
    }
    if crm.callback_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crm.callback_url is required and must match the connected app's callback URL"
                .to_string(),
        ));
    }

    if crm.api_version.trim().is_empty()
        || !crm.api_version.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
    {
        return Err(ConfigError::Validation(
            "crm.api_version must be a dotted version number such as `59.0`".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    crm: Option<CrmPatch>,
    voice: Option<VoicePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CrmPatch {
    login_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    username: Option<String>,
    password: Option<String>,
    callback_url: Option<String>,
    api_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct VoicePatch {
    timezone: Option<String>,
    app_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
