//! Port for user-facing notifications.

use async_trait::async_trait;

use crate::domain::user::User;

/// Errors raised by notification adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    /// The delivery transport rejected or failed to accept the message.
    #[error("notification transport failed: {message}")]
    Transport {
        /// Transport-provided failure description.
        message: String,
    },
}

impl NotificationError {
    /// Build a [`NotificationError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Dispatches onboarding messages to users.
///
/// Delivery is fire-and-forget from the caller's perspective: a transport
/// failure after a successful creation leaves the created user in place.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserNotifier: Send + Sync {
    /// Issue a reset token for `user` and dispatch the set-password message.
    async fn send_set_password(&self, user: &User) -> Result<(), NotificationError>;
}
