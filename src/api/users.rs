//! Patron management endpoints (staff only)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::patron::{PatronListEntry, PatronQuery, PatronSummary, UpdateMaxBooks, UpdatePatronStatus},
};

use super::AdminIdentity;

#[derive(Serialize, ToSchema)]
pub struct PatronListResponse {
    pub users: Vec<PatronListEntry>,
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct PatronUpdatedResponse {
    pub message: String,
    pub user: PatronSummary,
}

/// List patrons
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(PatronQuery),
    responses(
        (status = 200, description = "Patrons with open loan counts", body = PatronListResponse)
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    _admin: AdminIdentity,
    Query(query): Query<PatronQuery>,
) -> AppResult<Json<PatronListResponse>> {
    let (users, total) = state.services.users.list(&query).await?;
    Ok(Json(PatronListResponse { users, total }))
}

/// Suspend, deactivate or reactivate a patron
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/status",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Patron ID")),
    request_body = UpdatePatronStatus,
    responses(
        (status = 200, description = "Status changed", body = PatronUpdatedResponse),
        (status = 404, description = "Patron not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_status(
    State(state): State<crate::AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i32>,
    Json(request): Json<UpdatePatronStatus>,
) -> AppResult<Json<PatronUpdatedResponse>> {
    let patron = state.services.users.update_status(id, request.status).await?;
    Ok(Json(PatronUpdatedResponse {
        message: format!("User status set to {}", patron.status),
        user: patron.summary(),
    }))
}

/// Change a patron's borrowing cap
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/max-books",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Patron ID")),
    request_body = UpdateMaxBooks,
    responses(
        (status = 200, description = "Borrowing cap changed", body = PatronUpdatedResponse),
        (status = 400, description = "Invalid value", body = crate::error::ErrorResponse),
        (status = 404, description = "Patron not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_max_books(
    State(state): State<crate::AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i32>,
    Json(request): Json<UpdateMaxBooks>,
) -> AppResult<Json<PatronUpdatedResponse>> {
    let patron = state.services.users.update_max_books(id, request).await?;
    Ok(Json(PatronUpdatedResponse {
        message: "Borrowing limit updated".to_string(),
        user: patron.summary(),
    }))
}
