//! Notifications repository

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::notification::{NewNotification, Notification},
};

/// Unread notifications shown on the dashboard
const UNREAD_LIMIT: i64 = 10;

/// Insert a notification inside the caller's transaction
pub async fn insert_notification(
    tx: &mut Transaction<'_, Postgres>,
    notification: &NewNotification,
    now: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO notifications (user_id, title, message, type, read, created_at)
        VALUES ($1, $2, $3, $4, FALSE, $5)
        "#,
    )
    .bind(notification.user_id)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.kind)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[derive(Clone)]
pub struct NotificationsRepository {
    pool: Pool<Postgres>,
}

impl NotificationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Newest unread notifications for a patron
    pub async fn unread_for_patron(&self, patron_id: i32) -> AppResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1 AND read = FALSE
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(patron_id)
        .bind(UNREAD_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Mark one of the patron's notifications as read
    pub async fn mark_read(&self, patron_id: i32, notification_id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(patron_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Notification with id {} not found",
                notification_id
            )));
        }

        Ok(())
    }
}
