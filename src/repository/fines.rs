//! Fines repository

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::fine::{Fine, FineDetails, FineStatus},
};

#[derive(Clone)]
pub struct FinesRepository {
    pool: Pool<Postgres>,
}

impl FinesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Pending fines with borrower and book, newest first
    pub async fn list_pending(&self) -> AppResult<Vec<FineDetails>> {
        let fines = sqlx::query_as::<_, FineDetails>(
            r#"
            SELECT f.id,
                   u.first_name || ' ' || u.last_name as user_name,
                   u.email as user_email,
                   b.title as book_title,
                   f.amount, f.reason, f.created_at
            FROM fines f
            JOIN users u ON u.id = f.user_id
            JOIN borrowings l ON l.id = f.borrowing_id
            JOIN books b ON b.id = l.book_id
            WHERE f.status = $1
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )
        .bind(FineStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(fines)
    }

    /// Move a pending fine to `paid` or `waived`
    pub async fn resolve(&self, fine_id: i32, status: FineStatus, now: DateTime<Utc>) -> AppResult<Fine> {
        let mut tx = self.pool.begin().await?;

        let fine = sqlx::query_as::<_, Fine>("SELECT * FROM fines WHERE id = $1 FOR UPDATE")
            .bind(fine_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fine with id {} not found", fine_id)))?;

        fine.ensure_pending()?;

        let paid_at = (status == FineStatus::Paid).then_some(now);
        let fine = sqlx::query_as::<_, Fine>(
            "UPDATE fines SET status = $1, paid_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status)
        .bind(paid_at)
        .bind(fine_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(fine)
    }
}
