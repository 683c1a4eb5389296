use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub const DEFAULT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_hour.geojson";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub feed_url: String,
    pub feed_timeout_secs: u64,
    pub run_interval_secs: u64,
    pub run_timeout_secs: u64,
    pub run_once: bool,
    pub max_consecutive_failures: u32,
    pub circuit_breaker_cooldown: u64,
    pub kafka_bootstrap_servers: String,
    pub kafka_sasl_mechanism: String,
    pub kafka_username: String,
    pub kafka_password: String,
    pub kafka_security_protocol: String,
    pub kafka_message_timeout_ms: u64,
    pub database_url: String,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let feed_url = env::var("FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());
        let feed_timeout_secs = parse_or("FEED_TIMEOUT_SECS", 10);
        let run_interval_secs = parse_or("RUN_INTERVAL_SECS", 60);
        let run_timeout_secs = parse_or("RUN_TIMEOUT_SECS", 50);
        let run_once = parse_or("RUN_ONCE", false);
        let max_consecutive_failures = parse_or("MAX_CONSECUTIVE_FAILURES", 5);
        let circuit_breaker_cooldown = parse_or("CIRCUIT_BREAKER_COOLDOWN", 300);

        let kafka_bootstrap_servers =
            env::var("KAFKA_BOOTSTRAP_SERVERS").unwrap_or_else(|_| "localhost:9092".to_string());
        let kafka_sasl_mechanism =
            env::var("KAFKA_SASL_MECHANISM").unwrap_or_else(|_| "SCRAM-SHA-256".to_string());
        let kafka_username = env::var("KAFKA_USERNAME").unwrap_or_default();
        let kafka_password = env::var("KAFKA_PASSWORD").unwrap_or_default();
        let kafka_security_protocol =
            env::var("KAFKA_SECURITY_PROTOCOL").unwrap_or_else(|_| "SASL_PLAINTEXT".to_string());
        let kafka_message_timeout_ms = parse_or("KAFKA_MESSAGE_TIMEOUT_MS", 5000);

        let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let db_name = env::var("DB_DATABASE").unwrap_or_else(|_| "earthquakes".to_string());
        let db_user = env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
        let db_pwd = env::var("DB_PWD").unwrap_or_else(|_| "postgres".to_string());

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            db_user, db_pwd, db_host, db_port, db_name
        );
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", 5);
        let run_migrations = parse_or("RUN_MIGRATIONS", false);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            feed_url,
            feed_timeout_secs,
            run_interval_secs,
            run_timeout_secs,
            run_once,
            max_consecutive_failures,
            circuit_breaker_cooldown,
            kafka_bootstrap_servers,
            kafka_sasl_mechanism,
            kafka_username,
            kafka_password,
            kafka_security_protocol,
            kafka_message_timeout_ms,
            database_url,
            db_max_connections,
            run_migrations,
            log_level,
        })
    }
}

/// Reads `key` from the environment, falling back to `default` when unset or unparseable.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
