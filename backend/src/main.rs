//! Backend entry-point: wires the HTTP endpoints and session middleware.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpServer, web};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http;
use backend::inbound::http::session::SESSION_COOKIE_NAME;
use backend::server::{AppSettings, build_state};

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

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(std::io::Error::other)?;

    // Sessions do not survive a restart; derive the key from a mounted
    // secret before running more than one instance.
    let key = Key::generate();
    let cookie_secure = settings.cookie_secure();
    let bind_addr = settings.bind_addr().to_owned();
    let state = web::Data::new(build_state(&settings));

    HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name(SESSION_COOKIE_NAME.to_owned())
            .cookie_path("/".into())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .build();

        App::new()
            .app_data(state.clone())
            .wrap(session)
            .configure(http::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
