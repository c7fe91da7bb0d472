//! Set-password notification adapter.
//!
//! Creation of an administered user dispatches a message inviting the user to
//! choose their own password. The notifier mints a reset token, renders the
//! set-password link, and hands the message to a pluggable transport.

use std::sync::Arc;

use async_trait::async_trait;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::ports::{NotificationError, UserNotifier};
use crate::domain::user::User;

/// Rendered set-password message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPasswordMessage {
    /// Destination email address.
    pub recipient: String,
    /// Absolute link the recipient follows to choose a password.
    pub link: String,
}

/// Delivery channel for rendered messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Hand one message to the channel.
    async fn deliver(&self, message: SetPasswordMessage) -> Result<(), NotificationError>;
}

/// Transport that records dispatches in the log stream instead of sending.
///
/// Default wiring until a mail channel is configured. The link is withheld
/// from the log because it embeds the reset token.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTransport;

#[async_trait]
impl NotificationTransport for TracingTransport {
    async fn deliver(&self, message: SetPasswordMessage) -> Result<(), NotificationError> {
        info!(recipient = %message.recipient, "set-password notification dispatched");
        Ok(())
    }
}

/// [`UserNotifier`] that mints reset tokens and renders set-password links.
pub struct SetPasswordNotifier {
    transport: Arc<dyn NotificationTransport>,
    base_url: String,
}

impl SetPasswordNotifier {
    /// Notifier rendering links under `base_url`.
    pub fn new(transport: Arc<dyn NotificationTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    fn mint_token(user: &User) -> String {
        let mut seed = [0_u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(user.id().as_str().as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl UserNotifier for SetPasswordNotifier {
    async fn send_set_password(&self, user: &User) -> Result<(), NotificationError> {
        let token = Self::mint_token(user);
        let message = SetPasswordMessage {
            recipient: user.email().as_str().to_owned(),
            link: format!("{}/set-password?token={token}", self.base_url),
        };
        self.transport.deliver(message).await
    }
}

#[cfg(test)]
mod tests {
    //! Token minting and delivery behaviour.

    use chrono::Utc;
    use mockall::predicate;

    use super::*;
    use crate::domain::attributes::AttributeMap;
    use crate::domain::record::Record;

    fn sample_user() -> User {
        let attributes = AttributeMap::new()
            .with("first_name", "Ada")
            .with("last_name", "Lovelace")
            .with("email", "ada@example.com")
            .with("password", "hashed-secret");
        User::from_attributes(&attributes, Utc::now()).expect("valid attributes")
    }

    #[test]
    fn tokens_are_unique_per_mint() {
        let user = sample_user();
        assert_ne!(
            SetPasswordNotifier::mint_token(&user),
            SetPasswordNotifier::mint_token(&user)
        );
    }

    #[tokio::test]
    async fn message_targets_user_email_under_base_url() {
        let user = sample_user();
        let mut transport = MockNotificationTransport::new();
        transport
            .expect_deliver()
            .withf(|message| {
                message.recipient == "ada@example.com"
                    && message
                        .link
                        .starts_with("https://admin.example.com/set-password?token=")
            })
            .times(1)
            .returning(|_| Ok(()));

        let notifier = SetPasswordNotifier::new(Arc::new(transport), "https://admin.example.com");
        notifier
            .send_set_password(&user)
            .await
            .expect("delivery accepted");
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let mut transport = MockNotificationTransport::new();
        transport
            .expect_deliver()
            .with(predicate::always())
            .returning(|_| Err(NotificationError::transport("smtp refused")));

        let notifier = SetPasswordNotifier::new(Arc::new(transport), "https://admin.example.com");
        let error = notifier
            .send_set_password(&sample_user())
            .await
            .expect_err("transport failure");
        assert_eq!(error, NotificationError::transport("smtp refused"));
    }
}
