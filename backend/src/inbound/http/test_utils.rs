//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use crate::inbound::http::session::SESSION_COOKIE_NAME;

/// Session middleware matching the production cookie policy, minus TLS.
///
/// Issues the cookie under [`SESSION_COOKIE_NAME`] so extractors and test
/// assertions see the same cookie the server would set, but signs it with a
/// throwaway key and drops the `Secure` flag so plain-HTTP test requests
/// keep their session.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}
