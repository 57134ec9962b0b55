// Identity resolution chain: ordered handler walk over a per-request identity

pub mod handler;
pub mod responder;
pub mod verify;

use crate::chain::handler::{AuthenticationHandler, AuthenticationObserver};
use crate::chain::responder::{Disposition, Responder};
use crate::chain::verify::{ProtocolError, Verify, VerifyOutcome};
use crate::core::errors::IdentityError;
use crate::core::identity::Identity;
use crate::core::request::AuthRequest;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How a request leaves the resolver
#[derive(Debug)]
pub enum Resolution {
    /// The walk finished; continue the pipeline with this identity,
    /// authenticated or not
    Continue(Identity),
    /// The walk terminated the request with a disposition; downstream
    /// handlers never run
    Halt(Identity, Disposition),
}

struct Inner {
    handlers: Vec<Arc<dyn AuthenticationHandler>>,
    observers: Vec<Arc<dyn AuthenticationObserver>>,
    default_scheme: Option<String>,
}

/// Drives the per-request handler walk.
///
/// Holds the ordered handler list, the observer list and the optional
/// default scheme. All three are fixed at build time and shared read-only
/// across concurrent requests; per-request state lives in the [`Identity`]
/// and the verify result, both allocated fresh by [`resolve`].
///
/// [`resolve`]: IdentityResolver::resolve
#[derive(Clone)]
pub struct IdentityResolver {
    inner: Arc<Inner>,
}

impl IdentityResolver {
    pub fn builder() -> IdentityResolverBuilder {
        IdentityResolverBuilder::default()
    }

    /// Resolve the caller's identity for one request.
    ///
    /// Walks the handlers in registration order. Each handler settles a
    /// fresh verify result with exactly one of success, fail, error or skip;
    /// the first non-skip outcome terminates the walk. Exhausting the list
    /// (or an empty list) completes with an unauthenticated identity and no
    /// fault.
    pub async fn resolve(&self, request: Arc<AuthRequest>) -> Resolution {
        let identity = Identity::new(self.clone(), Arc::clone(&request));

        for handler in &self.inner.handlers {
            let scheme = handler.scheme();
            let (verify, outcome) = Verify::channel();
            handler.authenticate(&request, verify).await;

            // The handler may settle synchronously or from a spawned task;
            // either way the walk waits here, without a timeout.
            let outcome = match outcome.await {
                Ok(outcome) => outcome,
                Err(_) => VerifyOutcome::Error(ProtocolError::NoOutcome.into()),
            };

            match outcome {
                VerifyOutcome::Success { user, auth } => {
                    identity.set_authenticated(scheme, user, auth);
                    info!(scheme, "request authenticated");
                    return Resolution::Continue(identity);
                }
                VerifyOutcome::Fail { message } => {
                    warn!(scheme, reason = %message, "authentication failed");
                    let disposition = self
                        .challenge_with(handler, &request, None, Some(&message))
                        .await;
                    return Resolution::Halt(identity, disposition);
                }
                VerifyOutcome::Error(err) => {
                    error!(scheme, error = %err, "authentication handler error");
                    return Resolution::Halt(identity, Disposition::Error(err));
                }
                VerifyOutcome::Skip => {
                    debug!(scheme, "handler skipped");
                }
            }
        }

        debug!("no handler claimed the request");
        Resolution::Continue(identity)
    }

    /// Run the challenge procedure against one handler.
    ///
    /// A handler without the challenge capability yields an unauthorized
    /// failure carrying the fail reason, when one is available.
    pub(crate) async fn challenge_with(
        &self,
        handler: &Arc<dyn AuthenticationHandler>,
        request: &AuthRequest,
        params: Option<&Value>,
        message: Option<&str>,
    ) -> Disposition {
        if !handler.supports_challenge() {
            return Disposition::Send(IdentityError::Unauthorized(
                message.unwrap_or("authentication required").to_string(),
            ));
        }

        let (responder, disposition) = Responder::channel();
        handler.challenge(request, responder, params, message).await;
        match disposition.await {
            Ok(disposition) => disposition,
            Err(_) => Disposition::Error(ProtocolError::NoResponse.into()),
        }
    }

    /// Resolve which scheme a challenge targets: the explicit request, else
    /// the configured default, else the sole registered handler.
    pub(crate) fn resolve_scheme(&self, explicit: Option<&str>) -> Result<String, IdentityError> {
        if let Some(scheme) = explicit {
            return Ok(scheme.to_string());
        }
        if let Some(scheme) = &self.inner.default_scheme {
            return Ok(scheme.clone());
        }
        match self.inner.handlers.as_slice() {
            [only] => Ok(only.scheme().to_string()),
            _ => Err(IdentityError::AmbiguousScheme),
        }
    }

    pub(crate) fn handler_by_scheme(&self, scheme: &str) -> Option<&Arc<dyn AuthenticationHandler>> {
        self.inner.handlers.iter().find(|h| h.scheme() == scheme)
    }

    pub(crate) fn handlers(&self) -> &[Arc<dyn AuthenticationHandler>] {
        &self.inner.handlers
    }

    pub(crate) fn observers(&self) -> &[Arc<dyn AuthenticationObserver>] {
        &self.inner.observers
    }

    pub fn default_scheme(&self) -> Option<&str> {
        self.inner.default_scheme.as_deref()
    }
}

/// Builder for [`IdentityResolver`]
#[derive(Default)]
pub struct IdentityResolverBuilder {
    handlers: Vec<Arc<dyn AuthenticationHandler>>,
    observers: Vec<Arc<dyn AuthenticationObserver>>,
    default_scheme: Option<String>,
}

impl IdentityResolverBuilder {
    /// Append a handler to the walk order.
    ///
    /// Scheme names must be unique; a duplicate is registered anyway (the
    /// walk itself does not consult names) but challenge and deny lookups
    /// will only ever find the first, so the duplicate is logged.
    pub fn handler(mut self, handler: Arc<dyn AuthenticationHandler>) -> Self {
        if self.handlers.iter().any(|h| h.scheme() == handler.scheme()) {
            warn!(
                scheme = handler.scheme(),
                "duplicate authentication scheme registered"
            );
        }
        self.handlers.push(handler);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn AuthenticationObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Scheme that `challenge` targets when none is requested explicitly
    pub fn default_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.default_scheme = Some(scheme.into());
        self
    }

    pub fn build(self) -> IdentityResolver {
        IdentityResolver {
            inner: Arc::new(Inner {
                handlers: self.handlers,
                observers: self.observers,
                default_scheme: self.default_scheme,
            }),
        }
    }
}
