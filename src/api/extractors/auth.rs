use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use serde::Deserialize;
use tracing::Span;

/// Token claims minted by the identity provider. Tokens are verified here
/// but never issued by this service.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub tenant_id: Option<String>,
    pub role: Option<String>,
    pub exp: usize,
}

pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Owner-only routes are additionally scoped to the tenant in the path;
    /// a valid token for another tenant is still rejected.
    pub fn require_owner(&self, tenant_id: &str) -> Result<(), AppError> {
        let is_owner = self.0.role.as_deref() == Some("owner");
        let same_tenant = self.0.tenant_id.as_deref() == Some(tenant_id);
        if is_owner && same_tenant {
            Ok(())
        } else {
            Err(AppError::Forbidden("Not allowed for this tenant".into()))
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let token = bearer_token(parts).ok_or(StatusCode::UNAUTHORIZED)?;

        let decoding_key = DecodingKey::from_secret(app_state.config.auth_shared_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(&token, &decoding_key, &validation)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        Span::current().record("tenant_id", token_data.claims.tenant_id.as_deref().unwrap_or(""));
        Span::current().record("user_id", token_data.claims.sub.as_str());

        Ok(AuthUser(token_data.claims))
    }
}

pub(crate) fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get("Authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    Some(token.to_string())
}
