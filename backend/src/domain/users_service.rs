//! User management orchestration.
//!
//! Sits between the HTTP surface and the user gateway: fills in the
//! placeholder credential on creation, dispatches the set-password
//! notification, strips immutable fields from updates, and translates
//! no-match outcomes into not-found errors.

use std::sync::Arc;

use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{instrument, warn};

use crate::domain::attributes::AttributeMap;
use crate::domain::context::RequestContext;
use crate::domain::error::Error;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::UserNotifier;
use crate::domain::user::User;
use crate::domain::user_repository::UserRepository;

/// Fields the update flow refuses to change on an existing user.
const IMMUTABLE_FIELDS: &[&str] = &["email"];

/// Orchestrates administered user management.
pub struct UserService {
    users: UserRepository,
    notifier: Arc<dyn UserNotifier>,
    page_size: u32,
}

impl UserService {
    /// Service over `users` dispatching notifications through `notifier`.
    ///
    /// `page_size` bounds every listing page.
    pub fn new(users: UserRepository, notifier: Arc<dyn UserNotifier>, page_size: u32) -> Self {
        Self {
            users,
            notifier,
            page_size,
        }
    }

    /// Create a user and dispatch the set-password notification.
    ///
    /// Administrators never supply the password: when absent, an unguessable
    /// placeholder hash is stored and the user chooses their real password
    /// through the notification link.
    ///
    /// # Errors
    /// Gateway failures, plus `transport` when the notification could not be
    /// dispatched. The created user is kept in that case.
    #[instrument(skip_all)]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        mut attributes: AttributeMap,
    ) -> Result<User, Error> {
        if !attributes.contains("password") {
            attributes = attributes.with("password", placeholder_password_hash());
        }

        let user = self.users.create(ctx, &attributes).await?;
        if let Err(error) = self.notifier.send_set_password(&user).await {
            warn!(user = %user.id(), %error, "set-password notification failed; user kept");
            return Err(Error::transport(error.to_string()));
        }
        Ok(user)
    }

    /// Fetch a user by identifier.
    ///
    /// # Errors
    /// `not_found` when no live user has the identifier.
    pub async fn find(&self, id: &str) -> Result<User, Error> {
        self.users
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    /// Update a user, silently discarding any attempt to change fields in
    /// [`IMMUTABLE_FIELDS`]. Returns the refreshed user.
    ///
    /// # Errors
    /// `not_found` when no live user has the identifier, `invalid_request`
    /// when a supplied change violates entity invariants.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        attributes: AttributeMap,
    ) -> Result<User, Error> {
        let assignable = attributes.except(IMMUTABLE_FIELDS);
        let changed = self
            .users
            .update_by_model(ctx, &AttributeMap::new().with("id", id), &assignable)
            .await?;
        if !changed {
            return Err(Error::not_found("user not found"));
        }
        self.find(id).await
    }

    /// Soft-delete a user by identifier.
    ///
    /// # Errors
    /// `not_found` when no live user has the identifier.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), Error> {
        if self.users.delete(ctx, id).await? {
            Ok(())
        } else {
            Err(Error::not_found("user not found"))
        }
    }

    /// One page of users, newest update first, excluding the acting user.
    ///
    /// # Errors
    /// Gateway failures only.
    pub async fn list(&self, ctx: &RequestContext, page_number: u32) -> Result<Page<User>, Error> {
        self.users
            .list(ctx, PageRequest::new(page_number, self.page_size))
            .await
    }

    /// Fetch the acting user's own record.
    ///
    /// # Errors
    /// `unauthorized` when the context carries no actor.
    pub async fn profile(&self, ctx: &RequestContext) -> Result<User, Error> {
        let actor = require_actor(ctx)?;
        self.find(&actor).await
    }

    /// Update the acting user's own record; immutable fields are stripped
    /// exactly as in [`UserService::update`].
    ///
    /// # Errors
    /// `unauthorized` when the context carries no actor.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        attributes: AttributeMap,
    ) -> Result<User, Error> {
        let actor = require_actor(ctx)?;
        self.update(ctx, &actor, attributes).await
    }
}

fn require_actor(ctx: &RequestContext) -> Result<String, Error> {
    ctx.actor()
        .map(|actor| actor.as_str().to_owned())
        .ok_or_else(|| Error::unauthorized("login required"))
}

/// Unguessable stand-in credential stored until the user sets a password.
fn placeholder_password_hash() -> String {
    let mut seed = [0_u8; 32];
    rand::thread_rng().fill_bytes(&mut seed);
    hex::encode(Sha256::digest(seed))
}
