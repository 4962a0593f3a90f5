//! Profile endpoints for the authenticated user

use super::types::ApiResponse;
use crate::{auth::AuthUser, error::ApiResult, extract::ValidJson, AppState};
use axum::{extract::State, response::Json};
use bookshelf_core::{ProfileUpdate, UserInfo};

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/user/profile",
    tag = "User",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current profile", body = ApiResponse<UserInfo>),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User no longer exists")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ApiResponse<UserInfo>>> {
    let profile = state.profiles.profile(user.user_id).await?;
    Ok(Json(ApiResponse::ok("OK", profile)))
}

/// Update the caller's name, email or password
#[utoipa::path(
    put,
    path = "/api/user/profile",
    tag = "User",
    security(("bearer_auth" = [])),
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<UserInfo>),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(update): ValidJson<ProfileUpdate>,
) -> ApiResult<Json<ApiResponse<UserInfo>>> {
    let profile = state.profiles.update_profile(user.user_id, update).await?;
    Ok(Json(ApiResponse::ok("OK", profile)))
}
