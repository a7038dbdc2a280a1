use anyhow::Context;

use crate::metrics::METRICS_CAPACITY;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub metrics_capacity: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a valid number")?,
            metrics_capacity: match std::env::var("METRICS_CAPACITY") {
                Ok(raw) => raw
                    .parse()
                    .context("METRICS_CAPACITY must be a valid number")?,
                Err(_) => METRICS_CAPACITY,
            },
        })
    }
}
