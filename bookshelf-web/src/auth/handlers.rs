//! Registration and login endpoints

use crate::{
    error::ApiResult, extract::ValidJson, handlers::types::ApiResponse, AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use bookshelf_core::{AuthSession, LoginRequest, RegisterRequest};
use tracing::info;

/// User registration endpoint
///
/// Creates the account and returns the user together with a token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<AuthSession>),
        (status = 400, description = "Invalid request body"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthSession>>)> {
    let session = state.auth.register(request).await?;

    info!(user_id = %session.user.id, "Registration succeeded");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("OK", session)),
    ))
}

/// User login endpoint
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<AuthSession>),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Invalid credential")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthSession>>> {
    let session = state.auth.login(request).await?;

    info!(user_id = %session.user.id, "Login succeeded");
    Ok(Json(ApiResponse::ok("OK", session)))
}
