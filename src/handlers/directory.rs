// YAML credential directory: API keys and password-digest users in one file

use crate::core::errors::IdentityError;
use crate::handlers::api_key::{KeyStore, MemoryKeyStore};
use crate::handlers::basic::{MemoryUserVault, PasswordDigest, UserVault};
use crate::handlers::Account;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Root structure of the directory file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DirectoryYaml {
    #[serde(default)]
    api_keys: Vec<ApiKeyEntry>,
    #[serde(default)]
    users: Vec<UserEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiKeyEntry {
    key: String,
    user: Value,
    #[serde(default)]
    auth: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserEntry {
    username: String,
    password_sha256: String,
    user: Value,
    #[serde(default)]
    auth: Value,
}

/// Credential directory loaded from a YAML file.
///
/// Serves both the API key store and the Basic auth vault. Entries are
/// validated at load: duplicate keys or usernames and malformed password
/// digests are configuration errors, surfaced before the service starts
/// taking requests.
pub struct Directory {
    keys: Arc<MemoryKeyStore>,
    vault: Arc<MemoryUserVault>,
}

impl Directory {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, IdentityError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IdentityError::Configuration(format!(
                "directory file not found at {:?}",
                path
            )));
        }

        let yaml_content = fs::read_to_string(path).map_err(|e| {
            IdentityError::Configuration(format!("failed to read directory file: {}", e))
        })?;

        Self::from_yaml(&yaml_content)
    }

    pub fn from_yaml(yaml_content: &str) -> Result<Self, IdentityError> {
        let directory: DirectoryYaml = serde_yaml::from_str(yaml_content).map_err(|e| {
            IdentityError::Configuration(format!("failed to parse directory YAML: {}", e))
        })?;

        let mut seen_keys = HashSet::new();
        let mut keys = MemoryKeyStore::new();
        for entry in directory.api_keys {
            if !seen_keys.insert(entry.key.clone()) {
                return Err(IdentityError::Configuration(
                    "duplicate API key in directory".to_string(),
                ));
            }
            keys.insert(
                &entry.key,
                Account {
                    user: entry.user,
                    auth: entry.auth,
                },
            );
        }

        let mut vault = MemoryUserVault::new();
        for entry in directory.users {
            if vault.contains(&entry.username) {
                return Err(IdentityError::Configuration(format!(
                    "duplicate username '{}' in directory",
                    entry.username
                )));
            }
            let digest = PasswordDigest::from_hex(&entry.password_sha256).map_err(|_| {
                IdentityError::Configuration(format!(
                    "invalid password digest for user '{}'",
                    entry.username
                ))
            })?;
            vault.insert(
                entry.username,
                digest,
                Account {
                    user: entry.user,
                    auth: entry.auth,
                },
            );
        }

        Ok(Self {
            keys: Arc::new(keys),
            vault: Arc::new(vault),
        })
    }

    pub fn key_store(&self) -> Arc<dyn KeyStore> {
        Arc::clone(&self.keys) as Arc<dyn KeyStore>
    }

    pub fn user_vault(&self) -> Arc<dyn UserVault> {
        Arc::clone(&self.vault) as Arc<dyn UserVault>
    }
}
