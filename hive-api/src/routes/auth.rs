//! Login and identity endpoints.

use axum::{extract::State, Extension, Json};

use crate::dto::{LoginRequest, LoginResponse, UserResponse};
use crate::error::ApiResult;
use crate::middleware::auth::{issue_token, AuthClaims};
use crate::state::AppState;

/// Verify credentials and issue a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state.auth.verify_credentials(&req.email, &req.password).await?;
    let token = issue_token(&user, &state.jwt)?;
    tracing::info!(email = user.email, role = user.role.as_str(), "login");
    Ok(Json(LoginResponse { token, user: user.into() }))
}

/// Return the caller's account from their validated claims.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.auth.get_user(claims.user_id()?).await?;
    Ok(Json(user.into()))
}
