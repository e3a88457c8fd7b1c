//! Backend entry-point: loads settings, opens the database pool and serves
//! the `/v1` REST endpoints.

mod server;

use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use yamda::outbound::persistence::DbPool;
use yamda::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| {
        error!(error = %e, "failed to load settings");
        std::io::Error::other(e.to_string())
    })?;
    let pool_config = settings.pool_config().map_err(|e| {
        error!(error = %e, "invalid settings");
        std::io::Error::other(e)
    })?;

    let pool = DbPool::new(pool_config).await.map_err(|e| {
        error!(error = %e, "database connection pool could not be established");
        std::io::Error::other(e)
    })?;
    info!("database connection pool established");

    let bind_addr = settings.bind_addr();
    let config =
        ServerConfig::new(bind_addr, pool).with_max_body_bytes(settings.max_body_bytes());
    let server = create_server(config)?;
    info!(addr = %bind_addr, env = settings.env(), "starting server");
    server.await
}
