//! Fine management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::fine::FineDetails};

use super::{AdminIdentity, MessageResponse};

#[derive(Serialize, ToSchema)]
pub struct FinesResponse {
    pub fines: Vec<FineDetails>,
}

/// Pending fines
#[utoipa::path(
    get,
    path = "/api/admin/fines",
    tag = "fines",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending fines", body = FinesResponse)
    )
)]
pub async fn list_fines(
    State(state): State<crate::AppState>,
    _admin: AdminIdentity,
) -> AppResult<Json<FinesResponse>> {
    let fines = state.services.fines.list_pending().await?;
    Ok(Json(FinesResponse { fines }))
}

/// Mark a pending fine as paid
#[utoipa::path(
    post,
    path = "/api/admin/fines/{id}/pay",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fine ID")),
    responses(
        (status = 200, description = "Fine paid", body = MessageResponse),
        (status = 400, description = "Fine is not pending", body = crate::error::ErrorResponse),
        (status = 404, description = "Fine not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn pay_fine(
    State(state): State<crate::AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.fines.pay(id).await?;
    Ok(Json(MessageResponse::new("Fine marked as paid")))
}

/// Waive a pending fine
#[utoipa::path(
    post,
    path = "/api/admin/fines/{id}/waive",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fine ID")),
    responses(
        (status = 200, description = "Fine waived", body = MessageResponse),
        (status = 400, description = "Fine is not pending", body = crate::error::ErrorResponse),
        (status = 404, description = "Fine not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn waive_fine(
    State(state): State<crate::AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.fines.waive(id).await?;
    Ok(Json(MessageResponse::new("Fine waived successfully")))
}
