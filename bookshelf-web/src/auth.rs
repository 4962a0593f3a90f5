//! Bearer-token authentication for protected routes

pub mod handlers;


use crate::{error::ApiError, AppState};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use bookshelf_core::{Claims, TokenError, UserId};
use tracing::debug;

/// Identity taken from a validated token. Nothing else may supply it.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub claims: Claims,
}

/// Token from the `Authorization` header, with or without a `Bearer ` prefix
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, TokenError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(TokenError::Malformed)?
        .to_str()
        .map_err(|_| TokenError::Malformed)?
        .trim();

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => value,
    };

    if token.is_empty() {
        return Err(TokenError::Malformed);
    }
    Ok(token)
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_token(&parts.headers).inspect_err(|_| {
            debug!("Missing or unreadable Authorization header");
        })?;
        let claims = app_state.tokens().validate(token)?;
        let user_id = claims.user_id()?;

        Ok(AuthUser { user_id, claims })
    }
}
