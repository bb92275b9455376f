//! Inputs for [`super::create_server`].

use std::net::SocketAddr;
use std::path::PathBuf;

use foodgram::inbound::http::session_config::SessionSettings;
use foodgram::inbound::http::urls::PublicUrls;
use foodgram::outbound::persistence::DbPool;

/// Validated settings plus the database pool the adapters share.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) media_root: PathBuf,
    pub(crate) urls: PublicUrls,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        db_pool: DbPool,
        media_root: PathBuf,
        urls: PublicUrls,
    ) -> Self {
        Self {
            session,
            bind_addr,
            db_pool,
            media_root,
            urls,
        }
    }

    /// Socket address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
