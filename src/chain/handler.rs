// Authentication handler and observer traits

use crate::chain::responder::Responder;
use crate::chain::verify::Verify;
use crate::core::request::AuthRequest;
use async_trait::async_trait;
use serde_json::Value;

/// A pluggable authentication mechanism for one named scheme.
///
/// `authenticate` is the only required capability. Challenge and deny are
/// optional: a handler declares them present by overriding the matching
/// `supports_*` flag together with the method. The resolver dispatches on the
/// flag and falls back to a 401 or 403 response when the capability is
/// absent, so the default method bodies are never reached through the
/// resolver.
///
/// Scheme names must be unique among the handlers registered with one
/// resolver; lookups for challenge and deny match on the name.
#[async_trait]
pub trait AuthenticationHandler: Send + Sync {
    /// Unique name of this authentication scheme
    fn scheme(&self) -> &str;

    /// Attempt to authenticate the request.
    ///
    /// Must settle `verify` exactly once: `success` with both payloads,
    /// `fail` with a reason, `error` for request-level failures, or `skip`
    /// to abstain. Settlement may happen after this method returns, from a
    /// task holding a clone of `verify`.
    async fn authenticate(&self, request: &AuthRequest, verify: Verify);

    /// Whether this handler can challenge the caller for credentials
    fn supports_challenge(&self) -> bool {
        false
    }

    /// Prompt the caller to (re-)establish credentials.
    ///
    /// Invoked only when `supports_challenge` returns true. `params` carries
    /// caller-provided challenge options; `message` carries the failure
    /// reason when the challenge follows a `fail` outcome.
    async fn challenge(
        &self,
        request: &AuthRequest,
        responder: Responder,
        params: Option<&Value>,
        message: Option<&str>,
    ) {
        let _ = (request, params, message);
        let _ = responder.send(crate::core::errors::IdentityError::Unauthorized(
            "authentication required".to_string(),
        ));
    }

    /// Whether this handler can reject an authenticated caller
    fn supports_deny(&self) -> bool {
        false
    }

    /// Reject an authenticated caller's access.
    ///
    /// Invoked only when `supports_deny` returns true.
    async fn deny(&self, request: &AuthRequest, responder: Responder) {
        let _ = request;
        let _ = responder.send(crate::core::errors::IdentityError::Forbidden);
    }

    /// Notification that a caller logged in
    async fn on_login(&self, request: &AuthRequest, user: &Value, auth: &Value) {
        let _ = (request, user, auth);
    }

    /// Notification that a caller logged out
    async fn on_logout(&self, request: &AuthRequest, user: &Value, auth: &Value) {
        let _ = (request, user, auth);
    }
}

/// Receives login and logout notifications without taking part in the
/// authenticate, challenge or deny walk.
#[async_trait]
pub trait AuthenticationObserver: Send + Sync {
    async fn on_login(&self, request: &AuthRequest, user: &Value, auth: &Value) {
        let _ = (request, user, auth);
    }

    async fn on_logout(&self, request: &AuthRequest, user: &Value, auth: &Value) {
        let _ = (request, user, auth);
    }
}
