// Per-request identity record and its challenge/deny/login/logout actions

use crate::chain::responder::{Disposition, Responder};
use crate::chain::verify::ProtocolError;
use crate::chain::IdentityResolver;
use crate::core::errors::IdentityError;
use crate::core::request::AuthRequest;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Authentication state of one request.
///
/// `scheme`, `user` and `auth` are set together on success and cleared
/// together on logout, never partially.
#[derive(Debug, Default)]
struct AuthSlot {
    scheme: Option<String>,
    user: Option<Value>,
    auth: Option<Value>,
}

/// Options for [`Identity::challenge`]
#[derive(Debug, Default, Clone)]
pub struct ChallengeOptions {
    /// Scheme to challenge with; falls back to the resolver's default
    /// scheme, then to the sole registered handler
    pub scheme: Option<String>,
    /// Opaque parameters forwarded to the handler's challenge capability
    pub params: Option<Value>,
    /// Reason shown or forwarded with the challenge
    pub message: Option<String>,
}

/// The resolved (or still anonymous) identity of one request.
///
/// Created by the resolver, attached to the request's extensions, and read
/// by downstream handlers. Clones share the same per-request state slot, so
/// a logout through one clone is visible through all of them. Nothing is
/// shared between requests.
#[derive(Clone)]
pub struct Identity {
    resolver: IdentityResolver,
    request: Arc<AuthRequest>,
    slot: Arc<RwLock<AuthSlot>>,
}

impl Identity {
    pub(crate) fn new(resolver: IdentityResolver, request: Arc<AuthRequest>) -> Self {
        Self {
            resolver,
            request,
            slot: Arc::new(RwLock::new(AuthSlot::default())),
        }
    }

    pub(crate) fn set_authenticated(&self, scheme: &str, user: Value, auth: Value) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.scheme = Some(scheme.to_string());
        slot.user = Some(user);
        slot.auth = Some(auth);
    }

    /// True iff a handler authenticated this request
    pub fn is_authenticated(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .is_some()
    }

    /// Scheme of the handler that authenticated the caller
    pub fn scheme(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .scheme
            .clone()
    }

    /// Opaque principal payload recorded on success
    pub fn user(&self) -> Option<Value> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    /// Opaque authorization payload recorded on success
    pub fn auth(&self) -> Option<Value> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .auth
            .clone()
    }

    /// The request snapshot this identity was resolved for
    pub fn request(&self) -> &AuthRequest {
        &self.request
    }

    /// Prompt the caller to (re-)establish credentials.
    ///
    /// Scheme resolution order: `options.scheme`, the resolver's default
    /// scheme, the sole registered handler. Anything else is an
    /// ambiguous-scheme fault; a scheme no handler provides is an
    /// invalid-scheme fault. Both are returned synchronously to the caller,
    /// they are configuration errors rather than request-level failures.
    pub async fn challenge(&self, options: ChallengeOptions) -> Result<Disposition, IdentityError> {
        let scheme = self.resolver.resolve_scheme(options.scheme.as_deref())?;
        let handler = self
            .resolver
            .handler_by_scheme(&scheme)
            .ok_or_else(|| IdentityError::InvalidScheme(scheme.clone()))?;
        Ok(self
            .resolver
            .challenge_with(
                handler,
                &self.request,
                options.params.as_ref(),
                options.message.as_deref(),
            )
            .await)
    }

    /// Reject this (authenticated) caller's access.
    ///
    /// Dispatches to the authenticating handler's deny capability when it
    /// has one; in every other case the disposition is a plain forbidden
    /// response.
    pub async fn deny(&self) -> Disposition {
        if let Some(scheme) = self.scheme() {
            if let Some(handler) = self.resolver.handler_by_scheme(&scheme) {
                if handler.supports_deny() {
                    let (responder, disposition) = Responder::channel();
                    handler.deny(&self.request, responder).await;
                    return match disposition.await {
                        Ok(disposition) => disposition,
                        Err(_) => Disposition::Error(ProtocolError::NoResponse.into()),
                    };
                }
            }
        }
        Disposition::Send(IdentityError::Forbidden)
    }

    /// Notify handlers, then observers, that this caller logged in.
    ///
    /// Does not mutate the identity: handlers are expected to recognize the
    /// logged-in caller on a later request through state they own themselves,
    /// such as a session store.
    pub async fn login(&self, user: &Value, auth: &Value) -> Result<(), IdentityError> {
        if user.is_null() || auth.is_null() {
            return Err(ProtocolError::MissingCredentials.into());
        }
        for handler in self.resolver.handlers() {
            handler.on_login(&self.request, user, auth).await;
        }
        for observer in self.resolver.observers() {
            observer.on_login(&self.request, user, auth).await;
        }
        Ok(())
    }

    /// Notify handlers, then observers, that this caller logged out, then
    /// clear the identity. No-op when unauthenticated.
    pub async fn logout(&self) {
        let (user, auth) = {
            let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
            match (&slot.user, &slot.auth) {
                (Some(user), Some(auth)) => (user.clone(), auth.clone()),
                _ => return,
            }
        };
        for handler in self.resolver.handlers() {
            handler.on_logout(&self.request, &user, &auth).await;
        }
        for observer in self.resolver.observers() {
            observer.on_logout(&self.request, &user, &auth).await;
        }
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = AuthSlot::default();
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Payloads may carry credentials; log only the shape
        f.debug_struct("Identity")
            .field("scheme", &self.scheme())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
