// Immutable per-request snapshot handed to authentication handlers

use axum::http::{HeaderMap, Method, Uri};

/// Read-only view of the incoming request.
///
/// Captured once when the middleware runs and shared with every handler and
/// observer for the lifetime of the request, including handlers that settle
/// their verify result from a spawned task after `authenticate` has returned.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
}

impl AuthRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    /// Snapshot an HTTP request before it is handed to downstream services
    pub fn from_request<B>(request: &axum::http::Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Token from an `Authorization: Bearer {token}` header
    pub fn bearer_token(&self) -> Option<&str> {
        self.header("authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    /// Client IP address
    ///
    /// Checks `X-Forwarded-For` first (for proxied requests), then `X-Real-IP`.
    pub fn client_ip(&self) -> Option<&str> {
        self.header("x-forwarded-for")
            .or_else(|| self.header("x-real-ip"))
    }

    /// User agent string
    pub fn user_agent(&self) -> Option<&str> {
        self.header("user-agent")
    }
}
