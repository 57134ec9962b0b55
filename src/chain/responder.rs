// Single-use responder passed to challenge and deny capabilities

use crate::chain::verify::ProtocolError;
use crate::core::errors::IdentityError;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

/// How a challenge or deny resolved.
///
/// `Redirect` and `Send` terminate the request with a response; `Error` is
/// surfaced on the pipeline error channel. A challenge or deny never lets the
/// request continue to downstream handlers.
#[derive(Debug)]
pub enum Disposition {
    /// Redirect the caller, typically to a login page
    Redirect(String),
    /// Respond with this error's status and message
    Send(IdentityError),
    /// Surface this error on the pipeline error channel
    Error(IdentityError),
}

/// Single-use capability set handed to `challenge` and `deny`.
///
/// The handler must invoke exactly one of `redirect`, `send` or `error`;
/// the same consumed guard as [`crate::chain::verify::Verify`] applies.
#[derive(Clone)]
pub struct Responder {
    slot: Arc<Mutex<Option<oneshot::Sender<Disposition>>>>,
}

impl Responder {
    pub fn channel() -> (Self, oneshot::Receiver<Disposition>) {
        let (tx, rx) = oneshot::channel();
        let responder = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (responder, rx)
    }

    /// Redirect the caller to the given URL
    pub fn redirect(&self, url: impl Into<String>) -> Result<(), ProtocolError> {
        self.respond(Disposition::Redirect(url.into()))
    }

    /// Terminate the request with the given error response
    pub fn send(&self, error: IdentityError) -> Result<(), ProtocolError> {
        self.respond(Disposition::Send(error))
    }

    /// Surface an error on the pipeline error channel
    pub fn error(&self, err: impl Into<anyhow::Error>) -> Result<(), ProtocolError> {
        self.respond(Disposition::Error(IdentityError::Handler(err.into())))
    }

    fn respond(&self, disposition: Disposition) -> Result<(), ProtocolError> {
        let mut guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = guard.take().ok_or(ProtocolError::AlreadyResponded)?;
        tx.send(disposition).map_err(|_| ProtocolError::Stale)
    }
}
