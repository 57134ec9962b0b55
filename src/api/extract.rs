// Axum extractors for the resolved identity

use crate::api::responses::ApiError;
use crate::core::identity::Identity;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Identity>().cloned().ok_or_else(|| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "identity middleware not installed".to_string(),
            )
        })
    }
}

/// Extractor that rejects unauthenticated requests with 401.
///
/// ```ignore
/// async fn profile(Authenticated(identity): Authenticated) -> Json<Value> {
///     Json(identity.user().unwrap_or_default())
/// }
/// ```
pub struct Authenticated(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        if !identity.is_authenticated() {
            return Err(ApiError::new(
                StatusCode::UNAUTHORIZED,
                "authentication required".to_string(),
            ));
        }
        Ok(Authenticated(identity))
    }
}
