//! Application settings loaded via OrthoConfig.
//!
//! Values come from `--flags`, `FOODGRAM_*` environment variables or a
//! configuration file, in that order of precedence.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::inbound::http::urls::PublicUrls;
use crate::outbound::persistence::{DEFAULT_POOL_SIZE, PoolConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080/";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("FOODGRAM_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    #[error("invalid bind address {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid {field} {value:?}: {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
}

/// Runtime configuration for the server and tooling binaries.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FOODGRAM")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub pool_size: Option<u32>,
    /// Directory holding uploaded images.
    pub media_root: Option<PathBuf>,
    /// Base URL that media links are built from.
    pub public_base_url: Option<String>,
    /// Base URL of short links; defaults to the public base.
    pub short_link_base_url: Option<String>,
    /// Base URL of the frontend that short links redirect to; defaults to the
    /// public base.
    pub frontend_base_url: Option<String>,
    /// Apply pending migrations at startup.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl AppSettings {
    /// Listening address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// Connection string; there is no default.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Pool configuration for the database URL.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        Ok(PoolConfig::new(self.database_url()?)
            .with_max_size(self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)))
    }

    /// Media directory, falling back to `./media`.
    #[must_use]
    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    /// Link bases for responses.
    pub fn public_urls(&self) -> Result<PublicUrls, SettingsError> {
        let public = parse_url(
            "public base URL",
            self.public_base_url
                .as_deref()
                .unwrap_or(DEFAULT_PUBLIC_BASE_URL),
        )?;
        let short_link = self
            .short_link_base_url
            .as_deref()
            .map(|raw| parse_url("short-link base URL", raw))
            .transpose()?
            .unwrap_or_else(|| public.clone());
        let frontend = self
            .frontend_base_url
            .as_deref()
            .map(|raw| parse_url("frontend base URL", raw))
            .transpose()?
            .unwrap_or_else(|| public.clone());
        Ok(PublicUrls::new(public, short_link, frontend))
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|source| SettingsError::InvalidUrl {
        field,
        value: raw.to_owned(),
        source,
    })
}
