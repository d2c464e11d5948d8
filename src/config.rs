/*
 * Responsibility
 * - Load environment variables / .env (DATABASE_URL, CORS, login token lifetime, GraphQL)
 * - Validate values (fail startup when required ones are missing)
 */
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

use crate::graphql::options::DEFAULT_GRAPHQL_PATH;
use crate::services::accounts::token::DEFAULT_LOGIN_EXPIRATION_DAYS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub database_url: String,
    pub database_max_connections: u32,

    // None: tokens never expire
    pub login_expiration_days: Option<i64>,

    pub graphql_path: String,
    pub graphql_debug: bool,

    pub request_timeout_seconds: u64,
    pub request_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = parse_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let login_expiration_days = match std::env::var("LOGIN_EXPIRATION_DAYS") {
            Ok(v) => parse_expiration_days(&v)?,
            Err(_) => Some(DEFAULT_LOGIN_EXPIRATION_DAYS),
        };

        let graphql_path = std::env::var("GRAPHQL_PATH")
            .ok()
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| DEFAULT_GRAPHQL_PATH.to_string());

        // Debug logging of execution errors defaults to on outside production.
        let graphql_debug = match std::env::var("GRAPHQL_DEBUG") {
            Ok(v) => parse_flag(&v).ok_or(ConfigError::Invalid("GRAPHQL_DEBUG"))?,
            Err(_) => !app_env.is_production(),
        };

        let request_timeout_seconds = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let request_body_limit_bytes = std::env::var("REQUEST_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            database_url,
            database_max_connections,
            login_expiration_days,
            graphql_path,
            graphql_debug,
            request_timeout_seconds,
            request_body_limit_bytes,
        })
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_expiration_days(raw: &str) -> Result<Option<i64>, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "never" | "none" | "null" => Ok(None),
        v => v
            .parse::<i64>()
            .ok()
            .filter(|d| *d > 0 && Duration::try_days(*d).is_some())
            .map(Some)
            .ok_or(ConfigError::Invalid("LOGIN_EXPIRATION_DAYS")),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
