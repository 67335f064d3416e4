use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub worker_count: usize,
    pub shutdown_grace_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            worker_count: env::var("WORKER_COUNT")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .context("WORKER_COUNT must be a valid number")?,
            shutdown_grace_secs: env::var("SHUTDOWN_GRACE_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("SHUTDOWN_GRACE_SECS must be a valid number")?,
        })
    }
}
