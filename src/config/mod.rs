use crate::catalog::pagination::PAGE_SIZE;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub environment: String,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub pagination: PaginationConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub page_size: usize,
}

/// Request budgets per client IP, in requests per minute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub default_per_minute: u32,
    pub video_per_minute: u32,
    pub upload_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default_per_minute: 100,
            video_per_minute: 10,
            upload_per_minute: 3,
        }
    }
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/recipes.db".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid PORT value".to_string()))?;

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| "10485760".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_UPLOAD_SIZE value".to_string()))?;

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_MAX_CONNECTIONS value".to_string()))?;

        let min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_MIN_CONNECTIONS value".to_string()))?;

        let connection_timeout_seconds = std::env::var("DATABASE_CONNECTION_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_CONNECTION_TIMEOUT value".to_string()))?;

        let idle_timeout_seconds = std::env::var("DATABASE_IDLE_TIMEOUT")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_IDLE_TIMEOUT value".to_string()))?;

        let page_size = std::env::var("PAGE_SIZE")
            .unwrap_or_else(|_| PAGE_SIZE.to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid PAGE_SIZE value".to_string()))?;

        let default_per_minute = std::env::var("RATE_LIMIT_DEFAULT")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid RATE_LIMIT_DEFAULT value".to_string()))?;

        let video_per_minute = std::env::var("RATE_LIMIT_VIDEO")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid RATE_LIMIT_VIDEO value".to_string()))?;

        let upload_per_minute = std::env::var("RATE_LIMIT_UPLOAD")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid RATE_LIMIT_UPLOAD value".to_string()))?;

        Ok(Settings {
            environment,
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                min_connections,
                connection_timeout_seconds,
                idle_timeout_seconds,
            },
            server: ServerConfig {
                host,
                port,
                max_upload_size,
            },
            pagination: PaginationConfig { page_size },
            rate_limit: RateLimitConfig {
                default_per_minute,
                video_per_minute,
                upload_per_minute,
            },
        })
    }

    /// Settings suitable for tests and local tooling: in-memory store, default budgets
    pub fn in_memory() -> Self {
        Settings {
            environment: "test".to_string(),
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 5,
                min_connections: 1,
                connection_timeout_seconds: 30,
                idle_timeout_seconds: 600,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                max_upload_size: 10 * 1024 * 1024,
            },
            pagination: PaginationConfig {
                page_size: PAGE_SIZE,
            },
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Apply `serve --port/--host` on top of the environment
    pub fn with_server_overrides(mut self, port: Option<u16>, host: Option<String>) -> Self {
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(host) = host {
            self.server.host = host;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.pagination.page_size == 0 {
            return Err(Error::Config("Page size must be non-zero".to_string()));
        }

        let limits = &self.rate_limit;
        if limits.default_per_minute == 0
            || limits.video_per_minute == 0
            || limits.upload_per_minute == 0
        {
            return Err(Error::Config("Rate limits must be non-zero".to_string()));
        }

        Ok(())
    }
}
