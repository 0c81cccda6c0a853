//! Fine model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

text_enum! {
    FineReason {
        Overdue => "overdue",
        Damaged => "damaged",
        Lost => "lost",
    }
}

text_enum! {
    /// `paid` and `waived` are terminal
    FineStatus {
        Pending => "pending",
        Paid => "paid",
        Waived => "waived",
    }
}

/// Fine row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Fine {
    pub id: i32,
    pub user_id: i32,
    pub borrowing_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub reason: FineReason,
    pub status: FineStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Fine {
    /// Only pending fines can be paid or waived
    pub fn ensure_pending(&self) -> AppResult<()> {
        match self.status {
            FineStatus::Pending => Ok(()),
            status => Err(AppError::BusinessRule(format!("Fine is already {}", status))),
        }
    }
}

/// Pending fine with borrower and book, for the admin fines list
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct FineDetails {
    pub id: i32,
    pub user_name: String,
    pub user_email: String,
    pub book_title: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub reason: FineReason,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fine(status: FineStatus) -> Fine {
        Fine {
            id: 7,
            user_id: 1,
            borrowing_id: 3,
            amount: Decimal::new(150, 2),
            reason: FineReason::Overdue,
            status,
            created_at: Utc::now(),
            paid_at: None,
        }
    }

    #[test]
    fn test_only_pending_fines_resolve() {
        assert!(fine(FineStatus::Pending).ensure_pending().is_ok());

        match fine(FineStatus::Paid).ensure_pending() {
            Err(AppError::BusinessRule(msg)) => assert_eq!(msg, "Fine is already paid"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(fine(FineStatus::Waived).ensure_pending().is_err());
    }

    #[test]
    fn test_amount_serializes_as_number() {
        let json = serde_json::to_value(fine(FineStatus::Pending)).unwrap();
        assert_eq!(json["amount"], serde_json::json!(1.5));
        assert_eq!(json["reason"], "overdue");
    }
}
