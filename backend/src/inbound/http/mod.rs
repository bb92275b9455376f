//! HTTP inbound adapter exposing the REST endpoints.
//!
//! Everything under `/api` is registered through [`configure_api`] so the
//! server and the integration tests mount exactly the same routes.

pub mod auth;
pub mod catalogue;
pub mod error;
pub mod health;
pub mod media;
pub mod pages;
pub mod query;
pub mod recipes;
pub mod recipes_dto;
pub mod session;
pub mod session_config;
pub mod short_links;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod urls;
pub mod users;
pub mod validation;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

/// Upper bound for JSON bodies; recipe images arrive inline as data URIs.
pub const JSON_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// JSON extractor configuration reporting malformed bodies through the
/// standard error envelope.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|error, _req| {
            Error::invalid_request(format!("malformed JSON body: {error}")).into()
        })
}

/// Path extractor configuration: an unparsable path segment such as
/// `/recipes/abc/` names no resource.
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|error, _req| Error::not_found(format!("no such resource: {error}")).into())
}

/// Register every `/api` endpoint on `cfg`.
///
/// Literal segments such as `/users/me/` are registered before their
/// `{id}` siblings.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(auth::login)
        .service(auth::logout)
        .service(users::register)
        .service(users::list_users)
        .service(users::current_user)
        .service(users::set_avatar)
        .service(users::delete_avatar)
        .service(users::set_password)
        .service(users::list_subscriptions)
        .service(users::get_user)
        .service(users::subscribe)
        .service(users::unsubscribe)
        .service(catalogue::list_tags)
        .service(catalogue::get_tag)
        .service(catalogue::list_ingredients)
        .service(catalogue::get_ingredient)
        .service(recipes::list_recipes)
        .service(recipes::create_recipe)
        .service(recipes::download_shopping_cart)
        .service(recipes::get_recipe)
        .service(recipes::update_recipe)
        .service(recipes::delete_recipe)
        .service(recipes::add_favorite)
        .service(recipes::remove_favorite)
        .service(recipes::add_to_shopping_cart)
        .service(recipes::remove_from_shopping_cart)
        .service(recipes::get_short_link);
}

/// Register the endpoints served outside `/api`: stored media and short-link
/// redirects.
pub fn configure_public(cfg: &mut web::ServiceConfig) {
    cfg.app_data(path_config()).service(media::serve_media);
    short_links::configure_short_links(cfg);
}
