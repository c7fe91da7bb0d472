//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod error;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

/// Register every HTTP endpoint on the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(users::list_users)
        .service(users::create_user)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(users::get_profile)
        .service(users::update_profile)
        .service(users::logout);
}
