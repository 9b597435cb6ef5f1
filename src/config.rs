//! Environment-driven runtime configuration.
//!
//! Every value has a working default so a bare `glowstore serve` comes up
//! locally; `.env` is honored via dotenvy before any of this is read.

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

/// Env var fallback used when no real secret is configured. Fine for local
/// development, logged loudly so it never ships silently.
const DEV_JWT_SECRET: &str = "glowstore-dev-secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub dev_mode: bool,
}

impl Config {
    pub fn load() -> Self {
        let jwt_secret = env::var("STORE_JWT_SECRET").unwrap_or_else(|_| {
            warn!("STORE_JWT_SECRET not set, using built-in development secret");
            DEV_JWT_SECRET.to_string()
        });
        Self {
            port: try_load("STORE_PORT", "8080"),
            db_path: PathBuf::from(try_load::<String>("STORE_DB", "glowstore.db")),
            jwt_secret,
            dev_mode: env::var("STORE_DEV").is_ok_and(|v| v == "1" || v == "true"),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = match env::var(key) {
        Ok(value) => value,
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }
    };
    raw.parse()
        .map_err(|e| warn!("Invalid {key} value: {e}"))
        .unwrap_or_else(|()| {
            default
                .parse()
                .unwrap_or_else(|_| panic!("Default for {key} must parse"))
        })
}
