#![allow(dead_code)]
// Shared test fixtures: scripted handlers and a recording observer

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use warden::chain::handler::{AuthenticationHandler, AuthenticationObserver};
use warden::chain::responder::Responder;
use warden::chain::verify::Verify;
use warden::core::request::AuthRequest;

/// Plain GET / with no headers
pub fn request() -> Arc<AuthRequest> {
    Arc::new(AuthRequest::new(
        Method::GET,
        Uri::from_static("/"),
        HeaderMap::new(),
    ))
}

/// GET / with the given headers
pub fn request_with(headers: &[(&str, &str)]) -> Arc<AuthRequest> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.insert(
            name.parse::<HeaderName>().expect("valid header name"),
            HeaderValue::from_str(value).expect("valid header value"),
        );
    }
    Arc::new(AuthRequest::new(Method::GET, Uri::from_static("/"), map))
}

/// Always abstains
pub struct SkipHandler {
    pub name: &'static str,
}

#[async_trait]
impl AuthenticationHandler for SkipHandler {
    fn scheme(&self) -> &str {
        self.name
    }

    async fn authenticate(&self, _request: &AuthRequest, verify: Verify) {
        let _ = verify.skip();
    }
}

/// Always authenticates with fixed payloads
pub struct SuccessHandler {
    pub name: &'static str,
    pub user: Value,
    pub auth: Value,
}

#[async_trait]
impl AuthenticationHandler for SuccessHandler {
    fn scheme(&self) -> &str {
        self.name
    }

    async fn authenticate(&self, _request: &AuthRequest, verify: Verify) {
        let _ = verify.success(self.user.clone(), self.auth.clone());
    }
}

/// Always fails; gains the challenge capability (a redirect) when
/// `challenge_url` is set
pub struct FailHandler {
    pub name: &'static str,
    pub message: &'static str,
    pub challenge_url: Option<&'static str>,
}

#[async_trait]
impl AuthenticationHandler for FailHandler {
    fn scheme(&self) -> &str {
        self.name
    }

    async fn authenticate(&self, _request: &AuthRequest, verify: Verify) {
        let _ = verify.fail(self.message);
    }

    fn supports_challenge(&self) -> bool {
        self.challenge_url.is_some()
    }

    async fn challenge(
        &self,
        _request: &AuthRequest,
        responder: Responder,
        _params: Option<&Value>,
        _message: Option<&str>,
    ) {
        match self.challenge_url {
            Some(url) => {
                let _ = responder.redirect(url);
            }
            None => {
                let _ = responder.send(warden::core::errors::IdentityError::Unauthorized(
                    "authentication required".to_string(),
                ));
            }
        }
    }
}

/// Always reports a request-level error
pub struct ErrorHandler {
    pub name: &'static str,
}

#[async_trait]
impl AuthenticationHandler for ErrorHandler {
    fn scheme(&self) -> &str {
        self.name
    }

    async fn authenticate(&self, _request: &AuthRequest, verify: Verify) {
        let _ = verify.error(anyhow::anyhow!("credential backend unreachable"));
    }
}

/// Buggy handler that drops its verify result without settling it
pub struct NeverSettleHandler {
    pub name: &'static str,
}

#[async_trait]
impl AuthenticationHandler for NeverSettleHandler {
    fn scheme(&self) -> &str {
        self.name
    }

    async fn authenticate(&self, _request: &AuthRequest, _verify: Verify) {}
}

/// Settles success from a spawned task after `authenticate` has returned
pub struct DeferredSuccessHandler {
    pub name: &'static str,
    pub user: Value,
    pub auth: Value,
}

#[async_trait]
impl AuthenticationHandler for DeferredSuccessHandler {
    fn scheme(&self) -> &str {
        self.name
    }

    async fn authenticate(&self, _request: &AuthRequest, verify: Verify) {
        let user = self.user.clone();
        let auth = self.auth.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            let _ = verify.success(user, auth);
        });
    }
}

/// Skips, but stashes a clone of the verify result for later misuse
pub struct RetainHandler {
    pub name: &'static str,
    pub stash: Arc<Mutex<Option<Verify>>>,
}

#[async_trait]
impl AuthenticationHandler for RetainHandler {
    fn scheme(&self) -> &str {
        self.name
    }

    async fn authenticate(&self, _request: &AuthRequest, verify: Verify) {
        *self.stash.lock().unwrap() = Some(verify.clone());
        let _ = verify.skip();
    }
}

/// Abstains during the walk but carries a redirecting challenge capability
pub struct RedirectChallengeHandler {
    pub name: &'static str,
    pub url: &'static str,
}

#[async_trait]
impl AuthenticationHandler for RedirectChallengeHandler {
    fn scheme(&self) -> &str {
        self.name
    }

    async fn authenticate(&self, _request: &AuthRequest, verify: Verify) {
        let _ = verify.skip();
    }

    fn supports_challenge(&self) -> bool {
        true
    }

    async fn challenge(
        &self,
        _request: &AuthRequest,
        responder: Responder,
        _params: Option<&Value>,
        _message: Option<&str>,
    ) {
        let _ = responder.redirect(self.url);
    }
}

/// Authenticates and carries a deny capability that redirects
pub struct DenyingHandler {
    pub name: &'static str,
    pub user: Value,
    pub auth: Value,
    pub deny_url: &'static str,
}

#[async_trait]
impl AuthenticationHandler for DenyingHandler {
    fn scheme(&self) -> &str {
        self.name
    }

    async fn authenticate(&self, _request: &AuthRequest, verify: Verify) {
        let _ = verify.success(self.user.clone(), self.auth.clone());
    }

    fn supports_deny(&self) -> bool {
        true
    }

    async fn deny(&self, _request: &AuthRequest, responder: Responder) {
        let _ = responder.redirect(self.deny_url);
    }
}

/// Skips, recording login/logout notifications into a shared journal
pub struct NotifyHandler {
    pub name: &'static str,
    pub journal: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl AuthenticationHandler for NotifyHandler {
    fn scheme(&self) -> &str {
        self.name
    }

    async fn authenticate(&self, _request: &AuthRequest, verify: Verify) {
        let _ = verify.skip();
    }

    async fn on_login(&self, _request: &AuthRequest, _user: &Value, _auth: &Value) {
        self.journal
            .lock()
            .unwrap()
            .push(format!("handler:{}:login", self.name));
    }

    async fn on_logout(&self, _request: &AuthRequest, _user: &Value, _auth: &Value) {
        self.journal
            .lock()
            .unwrap()
            .push(format!("handler:{}:logout", self.name));
    }
}

/// Observer recording notifications into a shared journal
pub struct RecordingObserver {
    pub journal: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl AuthenticationObserver for RecordingObserver {
    async fn on_login(&self, _request: &AuthRequest, _user: &Value, _auth: &Value) {
        self.journal.lock().unwrap().push("observer:login".to_string());
    }

    async fn on_logout(&self, _request: &AuthRequest, _user: &Value, _auth: &Value) {
        self.journal.lock().unwrap().push("observer:logout".to_string());
    }
}
