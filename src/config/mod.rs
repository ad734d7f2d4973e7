use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::shortener::service::DEFAULT_BASE_URL;
use crate::shortener::ShortenerConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    /// Prefix prepended to every short code
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl DatabaseBackend {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            "memory" => DatabaseBackend::Memory,
            "sqlite" => DatabaseBackend::Sqlite,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres, memory"
                );
                DatabaseBackend::Sqlite
            }
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let backend = DatabaseBackend::parse(&var("DATABASE_BACKEND", "sqlite"));

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => match backend {
                DatabaseBackend::Postgres => {
                    let user = var("DB_USER", "postgres");
                    let credentials = match lookup("DB_PASSWORD") {
                        Some(password) => format!("{user}:{password}"),
                        None => user,
                    };
                    format!(
                        "postgres://{}@{}:{}/{}",
                        credentials,
                        var("DB_HOST", "localhost"),
                        var("DB_PORT", "5432"),
                        var("DB_NAME", "shrt"),
                    )
                }
                DatabaseBackend::Sqlite => "sqlite://./shrt.db?mode=rwc".to_string(),
                DatabaseBackend::Memory => String::new(),
            },
        };

        let max_connections = var("DATABASE_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;
        if max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be a positive integer");
        }

        let api_host = var("API_HOST", "127.0.0.1");
        let api_port = var("API_PORT", "8080")
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let base_url = var("BASE_URL", DEFAULT_BASE_URL);
        if base_url.is_empty() {
            anyhow::bail!("BASE_URL must not be empty");
        }

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            base_url,
        })
    }

    pub fn shortener(&self) -> ShortenerConfig {
        ShortenerConfig {
            base_url: self.base_url.clone(),
        }
    }
}
