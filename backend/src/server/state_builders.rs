//! Builds the HTTP state from Diesel repositories and the filesystem media
//! store.

use std::io;
use std::sync::Arc;

use actix_web::web;

use foodgram::inbound::http::state::{HttpState, HttpStatePorts};
use foodgram::outbound::media::CapStdMediaStore;
use foodgram::outbound::persistence::{
    DieselCatalogueRepository, DieselFollowRepository, DieselRecipeListRepository,
    DieselRecipeRepository, DieselShortLinkRepository, DieselUserRepository,
};
use tracing::info;

use super::ServerConfig;

/// Wire every port to its production adapter.
///
/// # Errors
/// Returns [`io::Error`] when the media root cannot be created or opened.
pub(crate) fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let pool = &config.db_pool;
    let media = CapStdMediaStore::open(&config.media_root)?;
    info!(media_root = %config.media_root.display(), "media store opened");

    let ports = HttpStatePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        follows: Arc::new(DieselFollowRepository::new(pool.clone())),
        recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
        recipe_lists: Arc::new(DieselRecipeListRepository::new(pool.clone())),
        catalogue: Arc::new(DieselCatalogueRepository::new(pool.clone())),
        short_links: Arc::new(DieselShortLinkRepository::new(pool.clone())),
        media: Arc::new(media),
    };
    Ok(web::Data::new(HttpState::new(ports, config.urls.clone())))
}
