//! Voxy Core - shared configuration layer
//!
//! Everything the other crates need before they can talk to the outside
//! world: layered configuration (defaults → `voxy.toml` → `VOXY_*` env
//! overrides → programmatic overrides) with secrecy-wrapped CRM credentials.

pub mod config;

pub use config::{
    AppConfig, ConfigError, ConfigOverrides, CrmConfig, LoadOptions, LogFormat, LoggingConfig,
    VoiceConfig,
};
