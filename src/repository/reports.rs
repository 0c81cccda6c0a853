//! Read-only queries behind dashboards and reports

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        dashboard::{
            AdminStats, DashboardStats, OverdueLoan, PopularBook, RecentTransaction, SubjectCount,
        },
        fine::FineStatus,
        loan::{days_overdue, LoanStatus, LoanWithBook},
        patron::PatronStatus,
        reservation::{ReservationStatus, ReservationWithBook},
    },
};

/// Rows shown in dashboard side lists
const LIST_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct ReportsRepository {
    pool: Pool<Postgres>,
}

impl ReportsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Front-page counters; "today" is the UTC calendar day of `now`
    pub async fn dashboard_stats(&self, now: DateTime<Utc>) -> AppResult<DashboardStats> {
        let today = now.date_naive();

        let (total_books, total_students, borrowed_today, returned_today): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM books),
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM borrowings WHERE (borrowed_date AT TIME ZONE 'UTC')::date = $1),
                    (SELECT COUNT(*) FROM borrowings WHERE (returned_date AT TIME ZONE 'UTC')::date = $1)
                "#,
            )
            .bind(today)
            .fetch_one(&self.pool)
            .await?;

        Ok(DashboardStats {
            total_books,
            total_students,
            borrowed_today,
            returned_today,
        })
    }

    pub async fn admin_stats(&self, now: DateTime<Utc>) -> AppResult<AdminStats> {
        let (total_books, total_users, borrowed_books, overdue_books, returned_books): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM books),
                (SELECT COUNT(*) FROM users WHERE status = $1),
                (SELECT COUNT(*) FROM borrowings WHERE status = $2),
                (SELECT COUNT(*) FROM borrowings WHERE status = $2 AND due_date < $4),
                (SELECT COUNT(*) FROM borrowings WHERE status = $3)
            "#,
        )
        .bind(PatronStatus::Active)
        .bind(LoanStatus::Borrowed)
        .bind(LoanStatus::Returned)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        let (paid_fine_users, unpaid_fine_users): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(DISTINCT user_id) FROM fines WHERE status = $1),
                (SELECT COUNT(DISTINCT user_id) FROM fines WHERE status = $2)
            "#,
        )
        .bind(FineStatus::Paid)
        .bind(FineStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        let books_by_subject = sqlx::query_as::<_, SubjectCount>(
            r#"
            SELECT COALESCE(subject, 'Unknown') as subject, COUNT(*) as count
            FROM books
            GROUP BY subject
            ORDER BY count DESC, subject
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(AdminStats {
            total_books,
            total_users,
            borrowed_books,
            overdue_books,
            returned_books,
            paid_fine_users,
            unpaid_fine_users,
            books_by_subject,
        })
    }

    pub async fn recent_transactions(&self) -> AppResult<Vec<RecentTransaction>> {
        let transactions = sqlx::query_as::<_, RecentTransaction>(
            r#"
            SELECT l.id,
                   u.first_name || ' ' || u.last_name as user_name,
                   b.title as book_title,
                   l.borrowed_date, l.due_date
            FROM borrowings l
            JOIN users u ON u.id = l.user_id
            JOIN books b ON b.id = l.book_id
            ORDER BY l.borrowed_date DESC, l.id DESC
            LIMIT $1
            "#,
        )
        .bind(LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Most overdue open loans first
    pub async fn overdue_loans(&self, now: DateTime<Utc>) -> AppResult<Vec<OverdueLoan>> {
        let mut loans = sqlx::query_as::<_, OverdueLoan>(
            r#"
            SELECT l.id,
                   u.first_name || ' ' || u.last_name as user_name,
                   u.email as user_email,
                   b.title as book_title,
                   l.due_date
            FROM borrowings l
            JOIN users u ON u.id = l.user_id
            JOIN books b ON b.id = l.book_id
            WHERE l.status = $1 AND l.due_date < $2
            ORDER BY l.due_date
            LIMIT $3
            "#,
        )
        .bind(LoanStatus::Borrowed)
        .bind(now)
        .bind(LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        for loan in &mut loans {
            loan.days_overdue = days_overdue(loan.due_date, now);
        }

        Ok(loans)
    }

    /// Every loan of a patron, newest first
    pub async fn patron_loans(&self, patron_id: i32) -> AppResult<Vec<LoanWithBook>> {
        let loans = sqlx::query_as::<_, LoanWithBook>(
            r#"
            SELECT l.id,
                   b.title as book_title,
                   b.author as book_author,
                   b.isbn as book_isbn,
                   b.description as book_description,
                   l.borrowed_date, l.due_date, l.returned_date, l.status,
                   l.renewal_count, l.max_renewals
            FROM borrowings l
            JOIN books b ON b.id = l.book_id
            WHERE l.user_id = $1
            ORDER BY l.borrowed_date DESC, l.id DESC
            "#,
        )
        .bind(patron_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    pub async fn patron_reservations(&self, patron_id: i32) -> AppResult<Vec<ReservationWithBook>> {
        let reservations = sqlx::query_as::<_, ReservationWithBook>(
            r#"
            SELECT r.id,
                   b.title as book_title,
                   b.author as book_author,
                   r.reserved_date, r.expiry_date, r.priority
            FROM reservations r
            JOIN books b ON b.id = r.book_id
            WHERE r.user_id = $1 AND r.status = $2
            ORDER BY r.reserved_date
            "#,
        )
        .bind(patron_id)
        .bind(ReservationStatus::Active)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    /// (borrowings, returns) since `start`
    pub async fn circulation_totals(&self, start: DateTime<Utc>) -> AppResult<(i64, i64)> {
        let totals: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM borrowings WHERE borrowed_date >= $1),
                (SELECT COUNT(*) FROM borrowings WHERE returned_date >= $1)
            "#,
        )
        .bind(start)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    pub async fn popular_books(&self, start: DateTime<Utc>) -> AppResult<Vec<PopularBook>> {
        let books = sqlx::query_as::<_, PopularBook>(
            r#"
            SELECT b.title, b.author, COUNT(l.id) as borrow_count
            FROM books b
            JOIN borrowings l ON l.book_id = b.id
            WHERE l.borrowed_date >= $1
            GROUP BY b.id, b.title, b.author
            ORDER BY borrow_count DESC, b.title
            LIMIT $2
            "#,
        )
        .bind(start)
        .bind(LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }
}
