// HTTP Basic authentication: password digests, user vault, handler

use crate::chain::handler::AuthenticationHandler;
use crate::chain::verify::Verify;
use crate::core::errors::IdentityError;
use crate::core::request::AuthRequest;
use crate::handlers::Account;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// SHA-256 digest of a password, stored instead of the plaintext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest([u8; 32]);

impl PasswordDigest {
    pub fn from_password(password: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Parse a 64-character hex digest, as stored in credential files
    pub fn from_hex(digest: &str) -> Result<Self, IdentityError> {
        let bytes = hex::decode(digest).map_err(|_| {
            IdentityError::Configuration("password digest must be hex".to_string())
        })?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            IdentityError::Configuration("password digest must be 64 hex characters".to_string())
        })?;
        Ok(Self(bytes))
    }

    pub fn ct_eq(&self, other: &PasswordDigest) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

/// Verifies username/password pairs against stored accounts
#[async_trait]
pub trait UserVault: Send + Sync {
    /// Returns the account when the credentials match, `None` for an unknown
    /// user or a wrong password
    async fn verify(&self, username: &str, password: &str)
        -> Result<Option<Account>, IdentityError>;
}

struct VaultEntry {
    digest: PasswordDigest,
    account: Account,
}

/// In-memory user vault keyed by username
#[derive(Default)]
pub struct MemoryUserVault {
    users: HashMap<String, VaultEntry>,
}

impl MemoryUserVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, username: impl Into<String>, digest: PasswordDigest, account: Account) {
        self.users.insert(username.into(), VaultEntry { digest, account });
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }
}

#[async_trait]
impl UserVault for MemoryUserVault {
    async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, IdentityError> {
        let presented = PasswordDigest::from_password(password);
        match self.users.get(username) {
            Some(entry) if entry.digest.ct_eq(&presented) => Ok(Some(entry.account.clone())),
            Some(_) => Ok(None),
            None => {
                // Burn a comparison so unknown users cost the same as a
                // wrong password
                let dummy = PasswordDigest::from_password("");
                let _ = dummy.ct_eq(&presented);
                Ok(None)
            }
        }
    }
}

/// `Authorization: Basic {base64(user:pass)}` handler.
///
/// Skips when no Basic credentials are presented; a malformed header or a
/// credential mismatch is a failure. No challenge capability.
pub struct BasicAuthHandler {
    scheme: String,
    vault: Arc<dyn UserVault>,
}

impl BasicAuthHandler {
    pub fn new(vault: Arc<dyn UserVault>) -> Self {
        Self {
            scheme: "basic".to_string(),
            vault,
        }
    }
}

fn decode_credentials(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[async_trait]
impl AuthenticationHandler for BasicAuthHandler {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    async fn authenticate(&self, request: &AuthRequest, verify: Verify) {
        let Some(header) = request.header("authorization") else {
            let _ = verify.skip();
            return;
        };
        if !header.starts_with("Basic ") {
            // Some other authorization flavor; not ours to judge
            let _ = verify.skip();
            return;
        }
        let Some((username, password)) = decode_credentials(header) else {
            let _ = verify.fail("invalid authorization header");
            return;
        };

        match self.vault.verify(&username, &password).await {
            Ok(Some(account)) => {
                let _ = verify.success(account.user, account.auth);
            }
            Ok(None) => {
                let _ = verify.fail("invalid username or password");
            }
            Err(err) => {
                let _ = verify.error(err);
            }
        }
    }
}
