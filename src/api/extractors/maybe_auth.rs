use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::api::extractors::auth::{bearer_token, Claims};
use crate::state::AppState;
use std::sync::Arc;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};

/// Guest-friendly variant: a missing or invalid token degrades to an
/// anonymous request instead of rejecting it.
pub struct MaybeAuthUser(pub Option<Claims>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let token = match bearer_token(parts) {
            Some(token) => token,
            None => return Ok(MaybeAuthUser(None)),
        };

        let decoding_key = DecodingKey::from_secret(app_state.config.auth_shared_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(&token, &decoding_key, &validation) {
            Ok(data) => Ok(MaybeAuthUser(Some(data.claims))),
            // Invalid token (expired, bad signature) -> treat as guest
            Err(_) => Ok(MaybeAuthUser(None)),
        }
    }
}
