//! User-specific persistence gateway.
//!
//! Thin specialization of the generic repository. The one behavioural
//! addition is listing: the acting user is filtered out so administrators
//! never see their own row in the management screens.

use std::sync::Arc;

use crate::domain::attributes::AttributeMap;
use crate::domain::context::RequestContext;
use crate::domain::error::Error;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{RecordObserver, RecordStore};
use crate::domain::repository::Repository;
use crate::domain::user::User;

/// Gateway for [`User`] records.
pub struct UserRepository {
    inner: Repository<User>,
}

impl UserRepository {
    /// Gateway over `store` with no observers registered.
    pub fn new(store: Arc<dyn RecordStore<User>>) -> Self {
        Self {
            inner: Repository::new(store),
        }
    }

    /// Register an observer for instance-level lifecycle events.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RecordObserver<User>>) -> Self {
        self.inner = self.inner.with_observer(observer);
        self
    }

    /// Insert a new user and dispatch `created` observers.
    ///
    /// # Errors
    /// As for [`Repository::create`].
    pub async fn create(
        &self,
        ctx: &RequestContext,
        attributes: &AttributeMap,
    ) -> Result<User, Error> {
        self.inner.create(ctx, attributes).await
    }

    /// Fetch a user by identifier; absence yields `Ok(None)`.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn find(&self, id: &str) -> Result<Option<User>, Error> {
        self.inner.find(id).await
    }

    /// First user matching all equality predicates.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn find_by(&self, predicates: &AttributeMap) -> Result<Option<User>, Error> {
        self.inner.find_by(predicates).await
    }

    /// Instance update by identifier, dispatching observers.
    ///
    /// # Errors
    /// As for [`Repository::update`].
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        attributes: &AttributeMap,
    ) -> Result<bool, Error> {
        self.inner.update(ctx, id, attributes).await
    }

    /// Bulk predicate update without observer dispatch.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn update_by(
        &self,
        predicates: &AttributeMap,
        changes: &AttributeMap,
    ) -> Result<u64, Error> {
        self.inner.update_by(predicates, changes).await
    }

    /// Resolve one user by predicates and update it as an instance.
    ///
    /// # Errors
    /// As for [`Repository::update_by_model`].
    pub async fn update_by_model(
        &self,
        ctx: &RequestContext,
        predicates: &AttributeMap,
        attributes: &AttributeMap,
    ) -> Result<bool, Error> {
        self.inner.update_by_model(ctx, predicates, attributes).await
    }

    /// Soft-delete by identifier, dispatching observers.
    ///
    /// # Errors
    /// As for [`Repository::delete`].
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<bool, Error> {
        self.inner.delete(ctx, id).await
    }

    /// Bulk predicate soft-delete without observer dispatch.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn delete_by(&self, predicates: &AttributeMap) -> Result<u64, Error> {
        self.inner.delete_by(predicates).await
    }

    /// Resolve one user by predicates and soft-delete it as an instance.
    ///
    /// # Errors
    /// As for [`Repository::delete_by_model`].
    pub async fn delete_by_model(
        &self,
        ctx: &RequestContext,
        predicates: &AttributeMap,
    ) -> Result<bool, Error> {
        self.inner.delete_by_model(ctx, predicates).await
    }

    /// One page of users, newest update first, with the acting user (when
    /// authenticated) filtered out.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn list(&self, ctx: &RequestContext, page: PageRequest) -> Result<Page<User>, Error> {
        match ctx.actor() {
            Some(actor) => self.inner.list_excluding(page, actor.as_str()).await,
            None => self.inner.list(page).await,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Listing must hide the acting user's own row.

    use super::*;
    use crate::domain::record::Record;
    use crate::outbound::persistence::InMemoryStore;

    fn attributes(email: &str) -> AttributeMap {
        AttributeMap::new()
            .with("first_name", "Ada")
            .with("last_name", "Lovelace")
            .with("email", email)
            .with("password", "hashed-secret")
    }

    #[tokio::test]
    async fn list_excludes_the_acting_user() {
        let repository = UserRepository::new(Arc::new(InMemoryStore::new()));
        let ctx = RequestContext::anonymous();
        let actor = repository
            .create(&ctx, &attributes("admin@example.com"))
            .await
            .expect("created");
        let other = repository
            .create(&ctx, &attributes("member@example.com"))
            .await
            .expect("created");

        let page = repository
            .list(
                &RequestContext::for_actor(actor.id().clone()),
                PageRequest::new(1, 10),
            )
            .await
            .expect("list");

        let ids: Vec<&str> = page.items().iter().map(Record::id).collect();
        assert_eq!(ids, vec![other.id().as_str()]);
    }

    #[tokio::test]
    async fn anonymous_list_returns_everyone() {
        let repository = UserRepository::new(Arc::new(InMemoryStore::new()));
        let ctx = RequestContext::anonymous();
        repository
            .create(&ctx, &attributes("admin@example.com"))
            .await
            .expect("created");
        repository
            .create(&ctx, &attributes("member@example.com"))
            .await
            .expect("created");

        let page = repository
            .list(&ctx, PageRequest::new(1, 10))
            .await
            .expect("list");
        assert_eq!(page.total_items(), 2);
    }
}
