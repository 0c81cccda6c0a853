//! Circulation repository: each operation is one transaction with its rows locked

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        fine::{Fine, FineReason, FineStatus},
        loan::{Loan, LoanStatus, ReturnOutcome},
        notification::NewNotification,
        patron::Patron,
        reservation::{Reservation, ReservationStatus},
    },
    services::circulation::{CirculationPolicy, SweepReport},
};

use super::notifications::insert_notification;

#[derive(Clone)]
pub struct CirculationRepository {
    pool: Pool<Postgres>,
}

impl CirculationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn lock_patron(tx: &mut Transaction<'_, Postgres>, patron_id: i32) -> AppResult<Patron> {
        sqlx::query_as::<_, Patron>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(patron_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", patron_id)))
    }

    async fn lock_book(tx: &mut Transaction<'_, Postgres>, book_id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
    }

    async fn lock_open_loan(
        tx: &mut Transaction<'_, Postgres>,
        patron_id: i32,
        book_id: i32,
    ) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            "SELECT * FROM borrowings WHERE user_id = $1 AND book_id = $2 AND status = $3 FOR UPDATE",
        )
        .bind(patron_id)
        .bind(book_id)
        .bind(LoanStatus::Borrowed)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Borrowing record not found".to_string()))
    }

    /// Create a loan, take one copy off the shelf and notify the patron
    pub async fn borrow(
        &self,
        policy: &CirculationPolicy,
        patron_id: i32,
        book_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        // Patron row first: serializes concurrent borrows against the cap
        let patron = Self::lock_patron(&mut tx, patron_id).await?;
        policy.check_active(&patron)?;
        let book = Self::lock_book(&mut tx, book_id).await?;

        let borrowed_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowings WHERE user_id = $1 AND status = $2",
        )
        .bind(patron_id)
        .bind(LoanStatus::Borrowed)
        .fetch_one(&mut *tx)
        .await?;

        let already_borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrowings WHERE user_id = $1 AND book_id = $2 AND status = $3)",
        )
        .bind(patron_id)
        .bind(book_id)
        .bind(LoanStatus::Borrowed)
        .fetch_one(&mut *tx)
        .await?;

        policy.check_borrow(&patron, borrowed_count, &book, already_borrowed)?;

        let due_date = policy.due_date(now);
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO borrowings (user_id, book_id, borrowed_date, due_date, renewal_count, max_renewals, status)
            VALUES ($1, $2, $3, $4, 0, $5, $6)
            RETURNING *
            "#,
        )
        .bind(patron_id)
        .bind(book_id)
        .bind(now)
        .bind(due_date)
        .bind(policy.max_renewals)
        .bind(LoanStatus::Borrowed)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET available_copies = available_copies - 1 WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        let notification = NewNotification::book_borrowed(patron_id, &book.title, &book.author, due_date);
        insert_notification(&mut tx, &notification, now).await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Close the open loan for (patron, book), restock the copy and charge any fine
    pub async fn return_book(
        &self,
        policy: &CirculationPolicy,
        patron_id: i32,
        book_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<ReturnOutcome> {
        let mut tx = self.pool.begin().await?;

        let open = Self::lock_open_loan(&mut tx, patron_id, book_id).await?;
        let charge = policy.overdue_charge(open.due_date, now);

        let loan = sqlx::query_as::<_, Loan>(
            "UPDATE borrowings SET returned_date = $1, status = $2 WHERE id = $3 RETURNING *",
        )
        .bind(now)
        .bind(LoanStatus::Returned)
        .bind(open.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE books SET available_copies = LEAST(available_copies + 1, total_copies) WHERE id = $1",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        let fine = match charge {
            Some(charge) => Some(
                sqlx::query_as::<_, Fine>(
                    r#"
                    INSERT INTO fines (user_id, borrowing_id, amount, reason, status, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING *
                    "#,
                )
                .bind(loan.user_id)
                .bind(loan.id)
                .bind(charge.amount)
                .bind(FineReason::Overdue)
                .bind(FineStatus::Pending)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?,
            ),
            None => None,
        };

        tx.commit().await?;

        Ok(ReturnOutcome {
            loan,
            fine,
            days_overdue: charge.map(|c| c.days).unwrap_or(0),
        })
    }

    /// Push the due date of the open loan for (patron, book) out by one period
    pub async fn renew(
        &self,
        policy: &CirculationPolicy,
        patron_id: i32,
        book_id: i32,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let open = Self::lock_open_loan(&mut tx, patron_id, book_id).await?;
        let renewal = policy.renew(&open)?;

        let loan = sqlx::query_as::<_, Loan>(
            "UPDATE borrowings SET due_date = $1, renewal_count = $2 WHERE id = $3 RETURNING *",
        )
        .bind(renewal.due_date)
        .bind(renewal.renewal_count)
        .bind(open.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Queue the patron for a book; priority is the active queue length plus one
    pub async fn reserve(
        &self,
        policy: &CirculationPolicy,
        patron_id: i32,
        book_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        // Book row lock serializes priority assignment for this book
        Self::lock_book(&mut tx, book_id).await?;

        let already_reserved: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE user_id = $1 AND book_id = $2 AND status = $3)",
        )
        .bind(patron_id)
        .bind(book_id)
        .bind(ReservationStatus::Active)
        .fetch_one(&mut *tx)
        .await?;

        if already_reserved {
            return Err(AppError::BusinessRule("Book already reserved".to_string()));
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations WHERE book_id = $1 AND status = $2",
        )
        .bind(book_id)
        .bind(ReservationStatus::Active)
        .fetch_one(&mut *tx)
        .await?;

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (user_id, book_id, reserved_date, expiry_date, status, priority)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(patron_id)
        .bind(book_id)
        .bind(now)
        .bind(policy.reservation_expiry(now))
        .bind(ReservationStatus::Active)
        .bind(policy.reservation_priority(active))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Book already reserved"))?;

        tx.commit().await?;
        Ok(reservation)
    }

    /// Expire lapsed reservations and post one overdue notice per late loan
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let mut tx = self.pool.begin().await?;

        let expired_reservations = sqlx::query(
            "UPDATE reservations SET status = $1 WHERE status = $2 AND expiry_date < $3",
        )
        .bind(ReservationStatus::Expired)
        .bind(ReservationStatus::Active)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let overdue: Vec<(i32, i32, DateTime<Utc>, String)> = sqlx::query_as(
            r#"
            SELECT l.id, l.user_id, l.due_date, b.title
            FROM borrowings l
            JOIN books b ON b.id = l.book_id
            WHERE l.status = $1 AND l.due_date < $2 AND l.overdue_notified_at IS NULL
            ORDER BY l.due_date
            FOR UPDATE OF l SKIP LOCKED
            "#,
        )
        .bind(LoanStatus::Borrowed)
        .bind(now)
        .fetch_all(&mut *tx)
        .await?;

        for (loan_id, user_id, due_date, title) in &overdue {
            insert_notification(&mut tx, &NewNotification::book_overdue(*user_id, title, *due_date), now)
                .await?;

            sqlx::query("UPDATE borrowings SET overdue_notified_at = $1 WHERE id = $2")
                .bind(now)
                .bind(loan_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(SweepReport {
            expired_reservations,
            overdue_notices: overdue.len() as u64,
        })
    }
}
