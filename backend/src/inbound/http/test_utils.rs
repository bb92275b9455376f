//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};

use super::session_config::{SessionSettings, session_middleware};

/// Production session middleware with a fresh key and `Secure` disabled, so
/// plain-HTTP test requests carry the cookie.
#[must_use]
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    session_middleware(&SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    })
}
