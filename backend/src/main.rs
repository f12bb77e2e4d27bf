//! Foodgram entry-point: loads settings, migrates the database, and serves
//! the REST API, short links, media, and OpenAPI docs.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use foodgram::config::AppSettings;
use foodgram::inbound::http::health::HealthState;
use foodgram::inbound::http::session_config::{BuildMode, session_settings_from_env};
use foodgram::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{ServerConfig, create_server};

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
        std::io::Error::other(format!("failed to load settings: {e}"))
    })?;
    let Some(database_url) = settings.database_url() else {
        return Err(std::io::Error::other(
            "FOODGRAM_DATABASE_URL must be set to start the server",
        ));
    };

    run_pending_migrations(database_url)
        .await
        .map_err(std::io::Error::other)?;
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(std::io::Error::other)?;

    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::current())
        .map_err(std::io::Error::other)?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(
        session,
        settings.bind_addr(),
        pool,
        settings.media_root(),
    );
    let server = create_server(health_state, config)?;
    server.await
}
