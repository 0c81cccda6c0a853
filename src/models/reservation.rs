//! Reservation (hold) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

text_enum! {
    /// All states but `active` are terminal
    ReservationStatus {
        Active => "active",
        Fulfilled => "fulfilled",
        Expired => "expired",
        Cancelled => "cancelled",
    }
}

/// Reservation row. `priority` is fixed at creation and may have gaps.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub reserved_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub status: ReservationStatus,
    pub priority: i32,
}

/// Active reservation joined with its book, for the patron dashboard
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReservationWithBook {
    pub id: i32,
    pub book_title: String,
    pub book_author: String,
    pub reserved_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub priority: i32,
}
