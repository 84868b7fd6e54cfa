use ridesync_pricing::FareTable;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub routing: RoutingConfig,
    pub business_rules: BusinessRules,
    #[serde(default)]
    pub fares: FareTable,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutingConfig {
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// How long a pending request stays eligible before the reclaimer
    /// cancels it
    #[serde(default = "default_request_ttl")]
    pub request_ttl_seconds: u64,
    /// Sliding-window cap on ledger rows per owner
    #[serde(default = "default_history_cap")]
    pub history_cap: u32,
    /// Client poll cadence; also the reclaimer tick
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
}

fn default_request_ttl() -> u64 {
    180
}

fn default_history_cap() -> u32 {
    20
}

fn default_refresh_interval() -> u64 {
    1
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of RIDESYNC)
            .add_source(config::Environment::with_prefix("RIDESYNC").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
