// Built-in authentication handlers

pub mod api_key;
pub mod basic;
pub mod directory;
pub mod session;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Principal and authorization payloads a store resolves credentials to.
///
/// Both values are opaque to the resolution protocol; they end up as the
/// identity's `user` and `auth` on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub user: Value,
    pub auth: Value,
}
