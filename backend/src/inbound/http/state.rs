//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the domain service and remain testable without real adapters.

use std::sync::Arc;

use crate::domain::users_service::UserService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User management service.
    pub users: Arc<UserService>,
}

impl HttpState {
    /// Bundle the user service for handler injection.
    pub fn new(users: Arc<UserService>) -> Self {
        Self { users }
    }
}
