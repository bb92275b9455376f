//! Backend entry-point: loads configuration, applies migrations and serves the
//! REST API, media files and short-link redirects.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use foodgram::inbound::http::health::HealthState;
use foodgram::inbound::http::session_config::{
    BuildMode, key_fingerprint, session_settings_from_env,
};
use foodgram::outbound::persistence::{DbPool, run_pending_migrations};
use foodgram::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session signing key loaded"
    );

    let database_url = settings.database_url()?.to_owned();
    if settings.run_migrations {
        let applied = web::block(move || run_pending_migrations(&database_url))
            .await
            .map_err(|err| eyre!("migration task failed: {err}"))??;
        info!(applied, "database schema up to date");
    }

    let pool = DbPool::new(settings.pool_config()?)
        .await
        .wrap_err("failed to build database pool")?;
    let config = ServerConfig::new(
        session,
        settings.bind_addr()?,
        pool,
        settings.media_root(),
        settings.public_urls()?,
    );
    info!(bind_addr = %config.bind_addr(), "starting server");

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await?;
    Ok(())
}
