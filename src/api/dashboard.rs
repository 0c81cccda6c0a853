//! Dashboard, statistics and report endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::dashboard::{
        AdminDashboard, CirculationReport, DashboardStats, ReportQuery, UserDashboard,
    },
};

use super::{AdminIdentity, MessageResponse, PatronIdentity};

/// Patron dashboard
#[utoipa::path(
    get,
    path = "/api/user/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Loans, reservations and unread notifications", body = UserDashboard),
        (status = 401, description = "Not logged in", body = crate::error::ErrorResponse)
    )
)]
pub async fn user_dashboard(
    State(state): State<crate::AppState>,
    identity: PatronIdentity,
) -> AppResult<Json<UserDashboard>> {
    let dashboard = state.services.dashboard.user_dashboard(identity.patron_id()).await?;
    Ok(Json(dashboard))
}

/// Mark a notification as read
#[utoipa::path(
    post,
    path = "/api/user/notifications/{id}/read",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = MessageResponse),
        (status = 404, description = "Notification not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_notification_read(
    State(state): State<crate::AppState>,
    identity: PatronIdentity,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .dashboard
        .mark_notification_read(identity.patron_id(), id)
        .await?;
    Ok(Json(MessageResponse::new("Notification marked as read")))
}

/// Staff dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library-wide statistics", body = AdminDashboard)
    )
)]
pub async fn admin_dashboard(
    State(state): State<crate::AppState>,
    _admin: AdminIdentity,
) -> AppResult<Json<AdminDashboard>> {
    let dashboard = state.services.dashboard.admin_dashboard().await?;
    Ok(Json(dashboard))
}

/// Front-page counters
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counters", body = DashboardStats)
    )
)]
pub async fn stats(
    State(state): State<crate::AppState>,
    _admin: AdminIdentity,
) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.dashboard.stats().await?;
    Ok(Json(stats))
}

/// Circulation report for a period
#[utoipa::path(
    get,
    path = "/api/admin/reports/circulation",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(ReportQuery),
    responses(
        (status = 200, description = "Circulation report", body = CirculationReport)
    )
)]
pub async fn circulation_report(
    State(state): State<crate::AppState>,
    _admin: AdminIdentity,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<CirculationReport>> {
    let report = state.services.dashboard.circulation_report(&query).await?;
    Ok(Json(report))
}
