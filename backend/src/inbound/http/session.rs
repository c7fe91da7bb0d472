//! Session helpers keeping handlers free of framework-specific logic.
//!
//! Wraps the Actix session so handlers deal only with domain-friendly
//! operations: persisting the authenticated user id and deriving the
//! request context the services and audit recorder consume.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::context::RequestContext;
use crate::domain::error::Error;
use crate::domain::user::UserId;

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Name of the session cookie issued by the server.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Newtype wrapper exposing higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    ///
    /// # Errors
    /// `internal` when the session backend rejects the write.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.as_str())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop the authenticated user from the session.
    pub fn clear_user(&self) {
        self.0.remove(USER_ID_KEY);
    }

    /// Fetch the current user id from the session, if present.
    ///
    /// A tampered or stale id is treated as an anonymous session rather than
    /// a hard failure.
    ///
    /// # Errors
    /// `internal` when the session backend rejects the read.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    ///
    /// # Errors
    /// `unauthorized` when no valid user id is in the session.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Request context carrying the session's actor and the request path.
    ///
    /// # Errors
    /// `internal` when the session backend rejects the read.
    pub fn request_context(&self, req: &HttpRequest) -> Result<RequestContext, Error> {
        let ctx = match self.user_id()? {
            Some(actor) => RequestContext::for_actor(actor),
            None => RequestContext::anonymous(),
        };
        Ok(ctx.with_path(req.path()))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
