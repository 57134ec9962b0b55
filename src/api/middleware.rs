// Axum identity resolution middleware

use crate::api::responses::ApiError;
use crate::chain::{IdentityResolver, Resolution};
use crate::core::request::AuthRequest;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Middleware state carrying the shared resolver
#[derive(Clone)]
pub struct IdentityState {
    resolver: IdentityResolver,
}

impl IdentityState {
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }
}

/// Identity resolution middleware function.
///
/// Runs the handler walk for the incoming request. When the walk completes,
/// the identity (authenticated or anonymous) is attached to the request's
/// extensions exactly once and the rest of the pipeline runs. When the walk
/// halts (a failed authentication's challenge, or a handler error), the
/// disposition becomes the response and downstream handlers never run.
///
/// Apply with `axum::middleware::from_fn_with_state`:
///
/// ```ignore
/// let state = IdentityState::new(resolver);
/// let app = Router::new()
///     .route("/", get(handler))
///     .layer(middleware::from_fn_with_state(state, identity_middleware));
/// ```
pub async fn identity_middleware(
    State(state): State<IdentityState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let snapshot = Arc::new(AuthRequest::from_request(&request));

    match state.resolver().resolve(snapshot).await {
        Resolution::Continue(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Resolution::Halt(_identity, disposition) => Ok(disposition.into_response()),
    }
}
