//! Application configuration management

use std::env;

use anyhow::{Context, Result};

use crate::geo::WGS84_SRID;
use crate::orm::params::{DEFAULT_RECORDS_PER_PAGE, MAX_RECORDS_PER_PAGE};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite connection URL (`sqlite:` prefix added when a bare path is given)
    pub database_url: String,

    pub database_max_connections: u32,

    /// Spatial reference system for venue locations
    pub geometry_srid: i32,

    /// `recordsPerPage` when a paged request does not send one
    pub default_page_size: i64,

    /// Upper bound applied to `recordsPerPage`
    pub max_page_size: i64,

    /// Request header carrying the authenticated caller id
    pub user_id_header: String,

    /// Insert the default genres and venues at start-up
    pub seed_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: "sqlite:./data/cinecatalog.db?mode=rwc".to_string(),
            database_max_connections: 10,
            geometry_srid: WGS84_SRID,
            default_page_size: DEFAULT_RECORDS_PER_PAGE,
            max_page_size: MAX_RECORDS_PER_PAGE,
            user_id_header: "x-user-id".to_string(),
            seed_data: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        // Prefer DATABASE_PATH, fall back to DATABASE_URL
        let database_url = env::var("DATABASE_PATH")
            .or_else(|_| env::var("DATABASE_URL"))
            .map(|raw| normalize_sqlite_url(&raw))
            .unwrap_or(defaults.database_url);

        let default_page_size: i64 = parse_var("DEFAULT_PAGE_SIZE", defaults.default_page_size)?;
        let max_page_size: i64 = parse_var("MAX_PAGE_SIZE", defaults.max_page_size)?;
        if default_page_size < 1 || max_page_size < 1 {
            anyhow::bail!("DEFAULT_PAGE_SIZE and MAX_PAGE_SIZE must be positive");
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),

            port: parse_var("PORT", defaults.port)?,

            database_url,

            database_max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,

            geometry_srid: parse_var("GEOMETRY_SRID", defaults.geometry_srid)?,

            default_page_size: default_page_size.min(max_page_size),

            max_page_size,

            user_id_header: env::var("USER_ID_HEADER")
                .map(|h| h.to_ascii_lowercase())
                .unwrap_or(defaults.user_id_header),

            seed_data: env::var("SEED_DATA")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.seed_data),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().with_context(|| format!("Invalid {name}")),
        Err(_) => Ok(default),
    }
}

/// `./data/x.db` → `sqlite:./data/x.db?mode=rwc`; URLs pass through.
fn normalize_sqlite_url(raw: &str) -> String {
    if raw.starts_with("sqlite:") {
        raw.to_string()
    } else {
        format!("sqlite:{raw}?mode=rwc")
    }
}
