// src/config.rs
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use crate::money::AmountValue;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Snapshot file; no persistence when unset.
    pub data_file: Option<PathBuf>,
    /// Fixed authorization-hold ceiling, in the auction's currency.
    pub hold_ceiling: AmountValue,
    pub close_interval_secs: u64,
    /// Seed admin account (user id, password); admins cannot self-register.
    pub admin_user: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        let data_file = env::var("DATA_FILE").ok().map(PathBuf::from);
        let hold_ceiling = env::var("HOLD_CEILING")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(500);
        let close_interval_secs = env::var("CLOSE_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        let admin_user = match (env::var("ADMIN_USER"), env::var("ADMIN_PASSWORD")) {
            (Ok(user), Ok(password)) => Some((user, password)),
            _ => None,
        };

        Config {
            host,
            port,
            data_file,
            hold_ceiling,
            close_interval_secs,
            admin_user,
        }
    }
}
