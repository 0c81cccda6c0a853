//! Circulation endpoints: borrow, return, renew, reserve

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, services::circulation::SweepReport};

use super::{AdminIdentity, PatronIdentity};

/// Book chosen by the logged-in patron
#[derive(Deserialize, ToSchema)]
pub struct BookRequest {
    pub book_id: i32,
}

/// Check-in performed by staff on behalf of a patron
#[derive(Deserialize, ToSchema)]
pub struct ReturnRequest {
    pub user_id: i32,
    pub book_id: i32,
}

#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    pub message: String,
    pub due_date: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub message: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub fine_amount: Decimal,
    pub days_overdue: i64,
}

#[derive(Serialize, ToSchema)]
pub struct RenewResponse {
    pub message: String,
    pub new_due_date: DateTime<Utc>,
    pub renewals_remaining: i32,
}

#[derive(Serialize, ToSchema)]
pub struct ReserveResponse {
    pub message: String,
    pub priority: i32,
    pub expiry_date: DateTime<Utc>,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/api/borrow",
    tag = "circulation",
    security(("bearer_auth" = [])),
    request_body = BookRequest,
    responses(
        (status = 200, description = "Book borrowed", body = BorrowResponse),
        (status = 400, description = "Limit reached, no copies or already borrowed", body = crate::error::ErrorResponse),
        (status = 401, description = "Not logged in", body = crate::error::ErrorResponse),
        (status = 403, description = "Account is suspended or inactive", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow(
    State(state): State<crate::AppState>,
    identity: PatronIdentity,
    Json(request): Json<BookRequest>,
) -> AppResult<Json<BorrowResponse>> {
    let loan = state
        .services
        .circulation
        .borrow(identity.patron_id(), request.book_id)
        .await?;

    Ok(Json(BorrowResponse {
        message: "Book borrowed successfully".to_string(),
        due_date: loan.due_date,
    }))
}

/// Return a book (staff check-in)
#[utoipa::path(
    post,
    path = "/api/return",
    tag = "circulation",
    security(("bearer_auth" = [])),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "Borrowing record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    _admin: AdminIdentity,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<ReturnResponse>> {
    let outcome = state
        .services
        .circulation
        .return_book(request.user_id, request.book_id)
        .await?;

    Ok(Json(ReturnResponse {
        message: "Book returned successfully".to_string(),
        fine_amount: outcome.fine.map(|f| f.amount).unwrap_or(Decimal::ZERO),
        days_overdue: outcome.days_overdue,
    }))
}

/// Renew a loan
#[utoipa::path(
    post,
    path = "/api/renew",
    tag = "circulation",
    security(("bearer_auth" = [])),
    request_body = BookRequest,
    responses(
        (status = 200, description = "Loan renewed", body = RenewResponse),
        (status = 400, description = "Maximum renewals reached", body = crate::error::ErrorResponse),
        (status = 404, description = "Borrowing record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn renew(
    State(state): State<crate::AppState>,
    identity: PatronIdentity,
    Json(request): Json<BookRequest>,
) -> AppResult<Json<RenewResponse>> {
    let loan = state
        .services
        .circulation
        .renew(identity.patron_id(), request.book_id)
        .await?;

    Ok(Json(RenewResponse {
        message: "Book renewed successfully".to_string(),
        new_due_date: loan.due_date,
        renewals_remaining: loan.renewals_remaining(),
    }))
}

/// Reserve a book
#[utoipa::path(
    post,
    path = "/api/reserve",
    tag = "circulation",
    security(("bearer_auth" = [])),
    request_body = BookRequest,
    responses(
        (status = 200, description = "Book reserved", body = ReserveResponse),
        (status = 400, description = "Book already reserved", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn reserve(
    State(state): State<crate::AppState>,
    identity: PatronIdentity,
    Json(request): Json<BookRequest>,
) -> AppResult<Json<ReserveResponse>> {
    let reservation = state
        .services
        .circulation
        .reserve(identity.patron_id(), request.book_id)
        .await?;

    Ok(Json(ReserveResponse {
        message: "Book reserved successfully".to_string(),
        priority: reservation.priority,
        expiry_date: reservation.expiry_date,
    }))
}

/// Run the expiry and overdue sweep now
#[utoipa::path(
    post,
    path = "/api/admin/sweep",
    tag = "circulation",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweep completed", body = SweepReport)
    )
)]
pub async fn sweep(
    State(state): State<crate::AppState>,
    _admin: AdminIdentity,
) -> AppResult<Json<SweepReport>> {
    let report = state.services.circulation.sweep(Utc::now()).await?;
    Ok(Json(report))
}
