//! Circulation ledger: borrow, return, renew, reserve and the overdue sweep
//!
//! [`CirculationPolicy`] holds every rule as a pure function over loaded rows;
//! the repository applies it inside one transaction per operation with the
//! affected rows locked.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::task::JoinHandle;
use utoipa::ToSchema;

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{days_overdue, Loan, ReturnOutcome},
        patron::{Patron, PatronType},
        reservation::Reservation,
    },
    repository::Repository,
};

/// Overdue charge computed at return time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverdueCharge {
    pub days: i64,
    pub amount: Decimal,
}

/// New due date after a renewal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renewal {
    pub due_date: DateTime<Utc>,
    pub renewal_count: i32,
    pub renewals_remaining: i32,
}

#[derive(Debug, Clone)]
pub struct CirculationPolicy {
    pub loan_period: Duration,
    pub max_renewals: i32,
    pub reservation_period: Duration,
    pub fine_per_day: Decimal,
    pub student_max_books: i32,
    pub faculty_max_books: i32,
}

impl Default for CirculationPolicy {
    fn default() -> Self {
        Self::from(&CirculationConfig::default())
    }
}

impl From<&CirculationConfig> for CirculationPolicy {
    fn from(config: &CirculationConfig) -> Self {
        Self {
            loan_period: Duration::days(config.loan_period_days),
            max_renewals: config.max_renewals,
            reservation_period: Duration::days(config.reservation_days),
            fine_per_day: Decimal::new(config.fine_per_day_cents, 2),
            student_max_books: config.student_max_books,
            faculty_max_books: config.faculty_max_books,
        }
    }
}

impl CirculationPolicy {
    /// Borrowing cap assigned at registration
    pub fn max_books_for(&self, user_type: PatronType) -> i32 {
        match user_type {
            PatronType::Student => self.student_max_books,
            PatronType::Faculty => self.faculty_max_books,
        }
    }

    pub fn due_date(&self, borrowed_at: DateTime<Utc>) -> DateTime<Utc> {
        borrowed_at + self.loan_period
    }

    pub fn check_active(&self, patron: &Patron) -> AppResult<()> {
        if !patron.is_active() {
            return Err(AppError::Authorization(
                "Account is suspended or inactive".to_string(),
            ));
        }
        Ok(())
    }

    /// Borrow preconditions, in the order patrons see them reported
    pub fn check_borrow(
        &self,
        patron: &Patron,
        borrowed_count: i64,
        book: &Book,
        already_borrowed: bool,
    ) -> AppResult<()> {
        self.check_active(patron)?;
        if borrowed_count >= i64::from(patron.max_books) {
            return Err(AppError::BusinessRule(format!(
                "You can only borrow up to {} books at a time",
                patron.max_books
            )));
        }
        if !book.is_available() {
            return Err(AppError::BusinessRule("No copies available".to_string()));
        }
        if already_borrowed {
            return Err(AppError::BusinessRule(
                "You already have this book borrowed".to_string(),
            ));
        }
        Ok(())
    }

    /// `None` for on-time returns and returns less than a full day late
    pub fn overdue_charge(&self, due_date: DateTime<Utc>, now: DateTime<Utc>) -> Option<OverdueCharge> {
        let days = days_overdue(due_date, now);
        let amount = self.fine_per_day * Decimal::from(days);
        (amount > Decimal::ZERO).then_some(OverdueCharge { days, amount })
    }

    /// Extends the current due date (not today's date) by one loan period
    pub fn renew(&self, loan: &Loan) -> AppResult<Renewal> {
        if loan.renewal_count >= loan.max_renewals {
            return Err(AppError::BusinessRule(
                "Maximum renewals reached for this book".to_string(),
            ));
        }
        let renewal_count = loan.renewal_count + 1;
        Ok(Renewal {
            due_date: loan.due_date + self.loan_period,
            renewal_count,
            renewals_remaining: loan.max_renewals - renewal_count,
        })
    }

    /// Position in the waitlist, assigned once at creation
    pub fn reservation_priority(&self, active_reservations: i64) -> i32 {
        i32::try_from(active_reservations).unwrap_or(i32::MAX - 1) + 1
    }

    pub fn reservation_expiry(&self, reserved_at: DateTime<Utc>) -> DateTime<Utc> {
        reserved_at + self.reservation_period
    }
}

/// Outcome of one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SweepReport {
    pub expired_reservations: u64,
    pub overdue_notices: u64,
}

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    policy: CirculationPolicy,
}

impl CirculationService {
    pub fn new(repository: Repository, policy: CirculationPolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> &CirculationPolicy {
        &self.policy
    }

    /// Borrow a book for the patron; returns the new loan
    pub async fn borrow(&self, patron_id: i32, book_id: i32) -> AppResult<Loan> {
        let loan = self
            .repository
            .circulation
            .borrow(&self.policy, patron_id, book_id, Utc::now())
            .await?;

        tracing::info!(
            loan_id = loan.id,
            patron_id,
            book_id,
            due_date = %loan.due_date,
            "Book borrowed"
        );
        Ok(loan)
    }

    /// Check a book back in, charging a fine when it is late
    pub async fn return_book(&self, patron_id: i32, book_id: i32) -> AppResult<ReturnOutcome> {
        let outcome = self
            .repository
            .circulation
            .return_book(&self.policy, patron_id, book_id, Utc::now())
            .await?;

        match &outcome.fine {
            Some(fine) => tracing::info!(
                loan_id = outcome.loan.id,
                patron_id,
                book_id,
                days_overdue = outcome.days_overdue,
                amount = %fine.amount,
                "Book returned late, fine issued"
            ),
            None => tracing::info!(loan_id = outcome.loan.id, patron_id, book_id, "Book returned"),
        }
        Ok(outcome)
    }

    /// Extend an open loan; returns the updated loan
    pub async fn renew(&self, patron_id: i32, book_id: i32) -> AppResult<Loan> {
        let loan = self
            .repository
            .circulation
            .renew(&self.policy, patron_id, book_id)
            .await?;

        tracing::info!(
            loan_id = loan.id,
            renewal_count = loan.renewal_count,
            due_date = %loan.due_date,
            "Loan renewed"
        );
        Ok(loan)
    }

    /// Place a hold on a book
    pub async fn reserve(&self, patron_id: i32, book_id: i32) -> AppResult<Reservation> {
        let reservation = self
            .repository
            .circulation
            .reserve(&self.policy, patron_id, book_id, Utc::now())
            .await?;

        tracing::info!(
            reservation_id = reservation.id,
            patron_id,
            book_id,
            priority = reservation.priority,
            "Book reserved"
        );
        Ok(reservation)
    }

    /// Expire lapsed reservations and notify borrowers of overdue loans
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let report = self.repository.circulation.sweep(now).await?;
        if report != SweepReport::default() {
            tracing::info!(
                expired_reservations = report.expired_reservations,
                overdue_notices = report.overdue_notices,
                "Circulation sweep completed"
            );
        }
        Ok(report)
    }
}

/// Run [`CirculationService::sweep`] every `period` until the runtime stops
pub fn spawn_sweeper(service: CirculationService, period: StdDuration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = service.sweep(Utc::now()).await {
                tracing::error!("Circulation sweep failed: {}", e);
            }
        }
    })
}
