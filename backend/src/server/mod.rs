//! Server wiring: configuration and dependency assembly.

use std::sync::Arc;

use crate::domain::activity::ActivityRecorder;
use crate::domain::user::User;
use crate::domain::user_repository::UserRepository;
use crate::domain::users_service::UserService;
use crate::inbound::http::state::HttpState;
use crate::outbound::notification::{SetPasswordNotifier, TracingTransport};
use crate::outbound::persistence::{InMemoryActivityLog, InMemoryStore};

pub mod config;

pub use config::AppSettings;

/// Assemble the handler state from application settings.
///
/// The in-memory adapters back the default deployment; swapping in durable
/// adapters is a wiring change here, not a domain change.
#[must_use]
pub fn build_state(settings: &AppSettings) -> HttpState {
    let audit_log = Arc::new(InMemoryActivityLog::new());
    let recorder = Arc::new(ActivityRecorder::new(User::activity_policy(), audit_log));
    let repository =
        UserRepository::new(Arc::new(InMemoryStore::new())).with_observer(recorder);
    let notifier = Arc::new(SetPasswordNotifier::new(
        Arc::new(TracingTransport),
        settings.set_password_base_url(),
    ));
    let users = UserService::new(repository, notifier, settings.page_size());
    HttpState::new(Arc::new(users))
}
