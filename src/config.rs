use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub base_url: String,
    pub session_ttl: Duration,
    pub auth_secret: String,
    pub payos: PayOsConfig,
}

#[derive(Debug, Clone)]
pub struct PayOsConfig {
    pub base_url: String,
    pub client_id: String,
    pub api_key: String,
    pub checksum_key: String,
}

impl Config {
    pub fn load() -> Self {
        let config = Self {
            port: try_load("DINE_PORT", "8080"),
            database_url: try_load("DATABASE_URL", "postgres://localhost/dine"),
            redis_url: var("DINE_REDIS_URL").ok(),
            base_url: try_load::<String>("DINE_BASE_URL", "http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),
            session_ttl: Duration::from_secs(try_load("DINE_SESSION_TTL_SECS", "1800")),
            auth_secret: read_secret("DINE_AUTH_SECRET"),
            payos: PayOsConfig {
                base_url: try_load::<String>("PAYOS_BASE_URL", "https://api-merchant.payos.vn")
                    .trim_end_matches('/')
                    .to_string(),
                client_id: read_secret("PAYOS_CLIENT_ID"),
                api_key: read_secret("PAYOS_API_KEY"),
                checksum_key: read_secret("PAYOS_CHECKSUM_KEY"),
            },
        };

        config.validate().expect("Environment misconfigured!");
        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.session_ttl.is_zero() {
            return Err("session ttl must be > 0".to_string());
        }
        if self.auth_secret.is_empty() {
            return Err("auth secret must not be empty".to_string());
        }
        if self.payos.client_id.is_empty()
            || self.payos.api_key.is_empty()
            || self.payos.checksum_key.is_empty()
        {
            return Err("payment gateway credentials must not be empty".to_string());
        }
        if self.base_url.is_empty() {
            return Err("base url must not be empty".to_string());
        }
        Ok(())
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn read_secret(secret_name: &str) -> String {
    if let Ok(value) = env::var(secret_name) {
        return value.trim().to_string();
    }

    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from environment or file: {e}");
        })
        .expect("Secrets misconfigured!")
}
