use axum::{RequestPartsExt, async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use tracing::warn;

use crate::error::AppError;

// --- Axum Extractor ---

/// Bearer token of the back-office user. It is not verified here: the
/// dealership backend owns authentication and rejects bad tokens itself,
/// so the token is only required to be present and forwarded unchanged.
#[derive(Debug, Clone)]
pub struct AdminToken(pub String);

impl AdminToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                warn!("Failed to extract Authorization header: {}", e);
                AppError::Unauthorized("Missing or invalid Authorization header".into())
            })?;

        let token = bearer.token().trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized("Empty bearer token".into()));
        }
        Ok(AdminToken(token.to_string()))
    }
}
