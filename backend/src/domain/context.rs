//! Request-scoped identity and routing context.
//!
//! The acting identity and request path are threaded explicitly through
//! gateways, services, and the activity recorder instead of being read from
//! ambient globals, so the same code paths serve HTTP and non-HTTP callers.

use crate::domain::user::UserId;

/// Context describing who triggered the current operation and from where.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    actor: Option<UserId>,
    request_path: Option<String>,
}

impl RequestContext {
    /// Context with no authenticated actor.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for an authenticated actor.
    #[must_use]
    pub fn for_actor(actor: UserId) -> Self {
        Self {
            actor: Some(actor),
            request_path: None,
        }
    }

    /// Attach the request path the operation arrived on.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.request_path = Some(path.into());
        self
    }

    /// Identifier of the authenticated actor, when any.
    #[must_use]
    pub fn actor(&self) -> Option<&UserId> {
        self.actor.as_ref()
    }

    /// Path of the request that triggered the operation, when known.
    #[must_use]
    pub fn request_path(&self) -> Option<&str> {
        self.request_path.as_deref()
    }

    /// True when the current request path points at a logout action.
    ///
    /// Substring match on the path. Audit suppression keys on this, which
    /// couples the policy to HTTP routing detail; non-HTTP callers simply
    /// leave the path unset.
    #[must_use]
    pub fn is_logout_request(&self) -> bool {
        self.request_path
            .as_deref()
            .is_some_and(|path| path.contains("logout"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for logout path detection.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("/api/v1/logout"), true)]
    #[case(Some("/api/v1/users/42"), false)]
    #[case(None, false)]
    fn logout_detection_matches_path_substring(
        #[case] path: Option<&str>,
        #[case] expected: bool,
    ) {
        let mut context = RequestContext::anonymous();
        if let Some(p) = path {
            context = context.with_path(p);
        }
        assert_eq!(context.is_logout_request(), expected);
    }
}
