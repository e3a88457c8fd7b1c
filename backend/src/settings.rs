//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `YAMDA_*` environment variables and config
//! files, in that order of precedence. Settings are read once at startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::inbound::http::json::DEFAULT_MAX_BODY_BYTES;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_ENV: &str = "development";
const DEFAULT_MAX_OPEN_CONNS: u32 = 25;
const DEFAULT_MAX_IDLE_CONNS: u32 = 25;
const DEFAULT_CONN_MAX_LIFETIME_MINS: u64 = 15;
const DEFAULT_CONN_MAX_IDLE_TIME_MINS: u64 = 15;
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 3;

/// Settings that cannot be turned into a running server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// No database URL was supplied.
    #[error("database URL is required (set YAMDA_DATABASE_URL or --database-url)")]
    MissingDatabaseUrl,
}

/// Server and database settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "YAMDA")]
pub struct AppSettings {
    /// Interface to listen on.
    pub host: Option<IpAddr>,
    /// Port to listen on.
    #[ortho_config(default = 4000)]
    pub port: u16,
    /// Deployment environment label, e.g. `development` or `production`.
    pub env: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum open connections.
    pub db_max_open_conns: Option<u32>,
    /// Idle connections kept open; clamped to the maximum.
    pub db_max_idle_conns: Option<u32>,
    /// Minutes before a connection is recycled.
    pub db_conn_max_lifetime_mins: Option<u64>,
    /// Minutes an idle connection may linger.
    pub db_conn_max_idle_time_mins: Option<u64>,
    /// Seconds each storage call may take.
    pub db_query_timeout_secs: Option<u64>,
    /// Request body ceiling in bytes.
    pub max_body_bytes: Option<usize>,
}

impl AppSettings {
    /// Address the server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port,
        )
    }

    /// Deployment environment label.
    pub fn env(&self) -> &str {
        self.env.as_deref().unwrap_or(DEFAULT_ENV)
    }

    /// Request body ceiling in bytes.
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }

    /// Connection pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when no URL is set.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self
            .database_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)?;
        let minutes = |m: u64| Some(Duration::from_secs(m.saturating_mul(60)));

        Ok(PoolConfig::new(url)
            .with_max_size(self.db_max_open_conns.unwrap_or(DEFAULT_MAX_OPEN_CONNS))
            .with_min_idle(Some(
                self.db_max_idle_conns.unwrap_or(DEFAULT_MAX_IDLE_CONNS),
            ))
            .with_max_lifetime(minutes(
                self.db_conn_max_lifetime_mins
                    .unwrap_or(DEFAULT_CONN_MAX_LIFETIME_MINS),
            ))
            .with_idle_timeout(minutes(
                self.db_conn_max_idle_time_mins
                    .unwrap_or(DEFAULT_CONN_MAX_IDLE_TIME_MINS),
            ))
            .with_query_timeout(Duration::from_secs(
                self.db_query_timeout_secs
                    .unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS),
            )))
    }
}
