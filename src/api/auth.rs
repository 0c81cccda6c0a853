//! Account endpoints: registration, patron and staff login, logout

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        admin::AdminRole,
        patron::{PatronSummary, RegisterPatron},
    },
};

use super::MessageResponse;

/// Patron login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Patron login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    /// Bearer token for patron endpoints
    pub token: String,
    pub user: PatronSummary,
}

#[derive(Deserialize, ToSchema)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AdminLoginResponse {
    pub message: String,
    pub role: AdminRole,
    /// Bearer token for admin endpoints
    pub token: String,
}

/// Register a new patron account
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "auth",
    request_body = RegisterPatron,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Invalid data or email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterPatron>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    state.services.auth.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Patron login
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
        (status = 403, description = "Account is suspended or inactive", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, patron) = state
        .services
        .auth
        .login_patron(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: patron.summary(),
    }))
}

/// Staff login
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "auth",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AdminLoginResponse),
        (status = 401, description = "Invalid admin credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn admin_login(
    State(state): State<crate::AppState>,
    Json(request): Json<AdminLoginRequest>,
) -> AppResult<Json<AdminLoginResponse>> {
    let (token, admin) = state
        .services
        .auth
        .login_admin(&request.username, &request.password)
        .await?;

    Ok(Json(AdminLoginResponse {
        message: "Admin login successful".to_string(),
        role: admin.role,
        token,
    }))
}

/// Logout; tokens are stateless, the client discards its token
#[utoipa::path(
    get,
    path = "/api/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Logged out successfully"))
}
