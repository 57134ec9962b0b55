// API key authentication: hashing, key store, handler

use crate::chain::handler::AuthenticationHandler;
use crate::chain::verify::Verify;
use crate::core::errors::IdentityError;
use crate::core::request::AuthRequest;
use crate::handlers::Account;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// SHA-256 digest of an API key.
///
/// Keys are hashed before lookup so stores never hold plaintext material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyHash([u8; 32]);

impl ApiKeyHash {
    pub fn from_api_key(api_key: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(api_key.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Constant-time comparison; lookup cost does not depend on where a
    /// match diverges
    pub fn ct_eq(&self, other: &ApiKeyHash) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Display for ApiKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// API key wrapper with memory protection.
///
/// Uses `secrecy::Secret` to keep the plaintext key out of logs and debug
/// output.
pub struct ApiKey(Secret<String>);

impl ApiKey {
    pub fn new(api_key: &str) -> Self {
        Self(Secret::new(api_key.to_string()))
    }

    pub fn hash(&self) -> ApiKeyHash {
        ApiKeyHash::from_api_key(self.0.expose_secret())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey").field("key", &"<REDACTED>").finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<REDACTED>")
    }
}

/// Resolves a hashed API key to an account
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn lookup(&self, hash: &ApiKeyHash) -> Result<Option<Account>, IdentityError>;
}

/// In-memory key store.
///
/// Keys are hashed on insert; lookup scans every entry with a constant-time
/// digest comparison.
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: Vec<(ApiKeyHash, Account)>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, api_key: &str, account: Account) {
        self.keys.push((ApiKeyHash::from_api_key(api_key), account));
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn lookup(&self, hash: &ApiKeyHash) -> Result<Option<Account>, IdentityError> {
        let mut found = None;
        for (candidate, account) in &self.keys {
            if candidate.ct_eq(hash) && found.is_none() {
                found = Some(account.clone());
            }
        }
        Ok(found)
    }
}

/// Header-based API key handler.
///
/// Skips when the header is absent so later handlers in the chain can claim
/// the request; an unknown key is a failure. The handler has no challenge
/// capability, so a failure surfaces as a 401 response.
pub struct ApiKeyHandler {
    scheme: String,
    header: String,
    store: Arc<dyn KeyStore>,
}

impl ApiKeyHandler {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self {
            scheme: "api-key".to_string(),
            header: DEFAULT_API_KEY_HEADER.to_string(),
            store,
        }
    }

    /// Override the header the key is read from
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }
}

#[async_trait]
impl AuthenticationHandler for ApiKeyHandler {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    async fn authenticate(&self, request: &AuthRequest, verify: Verify) {
        let Some(raw) = request.header(&self.header) else {
            let _ = verify.skip();
            return;
        };

        let key = ApiKey::new(raw);
        match self.store.lookup(&key.hash()).await {
            Ok(Some(account)) => {
                let _ = verify.success(account.user, account.auth);
            }
            Ok(None) => {
                let _ = verify.fail("invalid API key");
            }
            Err(err) => {
                let _ = verify.error(err);
            }
        }
    }
}
