// Structured audit events for login and logout

use crate::chain::handler::AuthenticationObserver;
use crate::core::request::AuthRequest;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

/// Identity lifecycle event type
#[derive(Debug, Clone, Copy)]
pub enum AuditEvent {
    Login,
    Logout,
}

impl AuditEvent {
    fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::Login => "LOGIN",
            AuditEvent::Logout => "LOGOUT",
        }
    }
}

/// Observer that emits a structured log line per login/logout.
///
/// Payloads may carry credentials, so only a subject field is extracted for
/// the log, never the whole user value.
#[derive(Default)]
pub struct AuditObserver;

impl AuditObserver {
    pub fn new() -> Self {
        Self
    }

    fn record(&self, event: AuditEvent, request: &AuthRequest, user: &Value) {
        let event_id = Uuid::new_v4();
        info!(
            event = event.as_str(),
            event_id = %event_id,
            at = %Utc::now().to_rfc3339(),
            subject = %subject_of(user),
            ip_address = ?request.client_ip(),
            user_agent = ?request.user_agent(),
            "identity event"
        );
    }
}

/// Best-effort subject label from an opaque user payload
fn subject_of(user: &Value) -> String {
    user.get("id")
        .or_else(|| user.get("username"))
        .or_else(|| user.get("sub"))
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[async_trait]
impl AuthenticationObserver for AuditObserver {
    async fn on_login(&self, request: &AuthRequest, user: &Value, _auth: &Value) {
        self.record(AuditEvent::Login, request, user);
    }

    async fn on_logout(&self, request: &AuthRequest, user: &Value, _auth: &Value) {
        self.record(AuditEvent::Logout, request, user);
    }
}
