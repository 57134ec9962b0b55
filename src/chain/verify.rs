// Single-use verify result passed to the active authentication handler

use crate::core::errors::IdentityError;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::oneshot;

/// Contract violations by a handler implementation.
///
/// These signal bugs in handler code, not request-level failures, and are
/// raised synchronously at the call site.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A verify callback was invoked after the result was already decided
    #[error("verify result already decided")]
    AlreadyDecided,

    /// `success` was invoked without both a user and an auth payload
    #[error("success requires both user and auth payloads")]
    MissingCredentials,

    /// The handler finished without invoking any verify callback
    #[error("handler completed without reporting an outcome")]
    NoOutcome,

    /// A responder callback was invoked after the responder was already used
    #[error("responder already used")]
    AlreadyResponded,

    /// A challenge or deny capability finished without using its responder
    #[error("challenge handler completed without responding")]
    NoResponse,

    /// The walk that issued this result is no longer active
    #[error("authentication walk is no longer active")]
    Stale,
}

/// Terminal outcome of one handler step
#[derive(Debug)]
pub enum VerifyOutcome {
    /// The handler authenticated the caller
    Success { user: Value, auth: Value },
    /// The handler rejected the presented credentials
    Fail { message: String },
    /// The handler hit a request-level error
    Error(IdentityError),
    /// The handler abstains; the walk moves to the next handler
    Skip,
}

/// Single-use result handed to `authenticate`.
///
/// Exactly one of `success`, `fail`, `error` or `skip` may be invoked, either
/// before `authenticate` returns or later from a spawned task holding a
/// clone. Every callback checks a consumed guard first; once the result is
/// decided, any further invocation is rejected and cannot affect the walk.
#[derive(Clone)]
pub struct Verify {
    slot: Arc<Mutex<Option<oneshot::Sender<VerifyOutcome>>>>,
}

impl Verify {
    /// Create a verify result and the receiver the walk awaits on.
    ///
    /// Dropping every clone without invoking a callback drops the sender,
    /// which the walk reports as [`ProtocolError::NoOutcome`] instead of
    /// waiting forever.
    pub fn channel() -> (Self, oneshot::Receiver<VerifyOutcome>) {
        let (tx, rx) = oneshot::channel();
        let verify = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (verify, rx)
    }

    /// The caller is authenticated with the given user and auth payloads.
    ///
    /// Both payloads must be present; a `Value::Null` in either position
    /// faults the walk without mutating the identity.
    pub fn success(&self, user: Value, auth: Value) -> Result<(), ProtocolError> {
        if user.is_null() || auth.is_null() {
            // Terminate the walk with a fault so it does not wait on a
            // handler that already considers itself done.
            self.settle(VerifyOutcome::Error(IdentityError::Protocol(
                ProtocolError::MissingCredentials,
            )))?;
            return Err(ProtocolError::MissingCredentials);
        }
        self.settle(VerifyOutcome::Success { user, auth })
    }

    /// The presented credentials were rejected; routes into the challenge
    /// procedure against the active handler.
    pub fn fail(&self, message: impl Into<String>) -> Result<(), ProtocolError> {
        self.settle(VerifyOutcome::Fail {
            message: message.into(),
        })
    }

    /// A request-level error occurred; surfaced on the pipeline error channel
    pub fn error(&self, err: impl Into<anyhow::Error>) -> Result<(), ProtocolError> {
        self.settle(VerifyOutcome::Error(IdentityError::Handler(err.into())))
    }

    /// This handler abstains from the request
    pub fn skip(&self) -> Result<(), ProtocolError> {
        self.settle(VerifyOutcome::Skip)
    }

    fn settle(&self, outcome: VerifyOutcome) -> Result<(), ProtocolError> {
        let mut guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = guard.take().ok_or(ProtocolError::AlreadyDecided)?;
        // The receiver is gone when the walk (or the whole request) has been
        // dropped; a late settlement from a retained clone lands here.
        tx.send(outcome).map_err(|_| ProtocolError::Stale)
    }
}
