// Bearer-token session authentication with a TTL-bounded store

use crate::chain::handler::AuthenticationHandler;
use crate::chain::responder::Responder;
use crate::chain::verify::Verify;
use crate::core::errors::IdentityError;
use crate::core::request::AuthRequest;
use crate::handlers::Account;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// One live session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub account: Account,
    pub created_at: DateTime<Utc>,
}

/// Session persistence owned by the handler.
///
/// The middleware never touches session state itself; recognizing a caller
/// on a later request is entirely this store's business.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, token: &str) -> Result<Option<SessionRecord>, IdentityError>;
    async fn put(&self, token: &str, record: SessionRecord) -> Result<(), IdentityError>;
    async fn remove(&self, token: &str) -> Result<(), IdentityError>;
}

/// In-memory session store with TTL expiration
pub struct MemorySessionStore {
    cache: Cache<String, Arc<SessionRecord>>,
}

impl MemorySessionStore {
    /// # Parameters
    /// * `ttl` - Sessions expire this long after creation
    /// * `max_capacity` - Maximum number of live sessions
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, token: &str) -> Result<Option<SessionRecord>, IdentityError> {
        Ok(self.cache.get(token).await.map(|record| (*record).clone()))
    }

    async fn put(&self, token: &str, record: SessionRecord) -> Result<(), IdentityError> {
        self.cache.insert(token.to_string(), Arc::new(record)).await;
        Ok(())
    }

    async fn remove(&self, token: &str) -> Result<(), IdentityError> {
        self.cache.invalidate(token).await;
        Ok(())
    }
}

/// `Authorization: Bearer {token}` session handler.
///
/// Skips when no bearer token is presented; an unknown or expired token is
/// a failure. With a login URL configured, the handler gains the challenge
/// capability and redirects there; without one, failures surface as 401.
/// Logout revokes the presented token.
pub struct SessionHandler {
    scheme: String,
    store: Arc<dyn SessionStore>,
    login_url: Option<String>,
}

impl SessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            scheme: "session".to_string(),
            store,
            login_url: None,
        }
    }

    /// Redirect challenges to this URL
    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = Some(url.into());
        self
    }

    /// Mint a session for an account and return its token.
    ///
    /// For login routes: verify credentials however the route sees fit, then
    /// issue a token and hand it to the client.
    pub async fn issue(&self, account: Account) -> Result<String, IdentityError> {
        let token = Uuid::new_v4().to_string();
        let record = SessionRecord {
            account,
            created_at: Utc::now(),
        };
        self.store.put(&token, record).await?;
        Ok(token)
    }
}

#[async_trait]
impl AuthenticationHandler for SessionHandler {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    async fn authenticate(&self, request: &AuthRequest, verify: Verify) {
        let Some(token) = request.bearer_token() else {
            let _ = verify.skip();
            return;
        };

        match self.store.get(token).await {
            Ok(Some(record)) => {
                let _ = verify.success(record.account.user, record.account.auth);
            }
            Ok(None) => {
                let _ = verify.fail("invalid or expired session");
            }
            Err(err) => {
                let _ = verify.error(err);
            }
        }
    }

    fn supports_challenge(&self) -> bool {
        self.login_url.is_some()
    }

    async fn challenge(
        &self,
        _request: &AuthRequest,
        responder: Responder,
        _params: Option<&Value>,
        message: Option<&str>,
    ) {
        match &self.login_url {
            Some(url) => {
                let _ = responder.redirect(url.clone());
            }
            None => {
                let _ = responder.send(IdentityError::Unauthorized(
                    message.unwrap_or("authentication required").to_string(),
                ));
            }
        }
    }

    async fn on_logout(&self, request: &AuthRequest, _user: &Value, _auth: &Value) {
        let Some(token) = request.bearer_token() else {
            return;
        };
        if let Err(err) = self.store.remove(token).await {
            warn!(error = %err, "failed to revoke session on logout");
        }
    }
}
