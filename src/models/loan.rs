//! Loan (borrowing) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::fine::Fine;

text_enum! {
    /// `borrowed -> returned` is the only wired transition; `overdue` and
    /// `lost` are declared for data compatibility.
    LoanStatus {
        Borrowed => "borrowed",
        Returned => "returned",
        Overdue => "overdue",
        Lost => "lost",
    }
}

/// Loan row from the `borrowings` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub renewal_count: i32,
    pub max_renewals: i32,
    pub status: LoanStatus,
    pub overdue_notified_at: Option<DateTime<Utc>>,
}

impl LoanStatus {
    /// Still out with the patron
    pub fn is_open(self) -> bool {
        self == LoanStatus::Borrowed
    }
}

impl Loan {
    pub fn renewals_remaining(&self) -> i32 {
        (self.max_renewals - self.renewal_count).max(0)
    }
}

/// Whole days elapsed since `due_date`, 0 when not yet due
pub fn days_overdue(due_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    if now > due_date {
        (now - due_date).num_days()
    } else {
        0
    }
}

/// Result of returning a loan
#[derive(Debug, Clone)]
pub struct ReturnOutcome {
    pub loan: Loan,
    pub fine: Option<Fine>,
    pub days_overdue: i64,
}

/// Loan row joined with its book, for the patron dashboard
#[derive(Debug, Clone, FromRow)]
pub struct LoanWithBook {
    pub id: i32,
    pub book_title: String,
    pub book_author: String,
    pub book_isbn: Option<String>,
    pub book_description: Option<String>,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub renewal_count: i32,
    pub max_renewals: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_days_overdue_floors_partial_days() {
        let now = Utc::now();
        assert_eq!(days_overdue(now - Duration::days(3), now), 3);
        assert_eq!(days_overdue(now - Duration::hours(71), now), 2);
        assert_eq!(days_overdue(now - Duration::hours(5), now), 0);
        assert_eq!(days_overdue(now + Duration::days(2), now), 0);
    }

    #[test]
    fn test_renewals_remaining_never_negative() {
        let now = Utc::now();
        let mut loan = Loan {
            id: 1,
            user_id: 1,
            book_id: 1,
            borrowed_date: now,
            due_date: now + Duration::days(14),
            returned_date: None,
            renewal_count: 1,
            max_renewals: 2,
            status: LoanStatus::Borrowed,
            overdue_notified_at: None,
        };
        assert_eq!(loan.renewals_remaining(), 1);
        assert!(loan.status.is_open());
        assert!(!LoanStatus::Returned.is_open());

        loan.renewal_count = 3;
        assert_eq!(loan.renewals_remaining(), 0);
    }
}
