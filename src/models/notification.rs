//! Patron notifications created as side effects of circulation events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

text_enum! {
    NotificationType {
        Info => "info",
        Warning => "warning",
        Error => "error",
        Success => "success",
    }
}

/// Notification row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: NotificationType,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: i32,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
}

impl NewNotification {
    pub fn book_borrowed(user_id: i32, title: &str, author: &str, due_date: DateTime<Utc>) -> Self {
        Self {
            user_id,
            title: "Book Borrowed Successfully".to_string(),
            message: format!(
                "You have borrowed \"{}\" by {}. Due date: {}",
                title,
                author,
                due_date.format("%B %d, %Y")
            ),
            kind: NotificationType::Success,
        }
    }

    pub fn book_overdue(user_id: i32, title: &str, due_date: DateTime<Utc>) -> Self {
        Self {
            user_id,
            title: "Book Overdue".to_string(),
            message: format!(
                "\"{}\" was due on {}. Please return it to avoid further fines.",
                title,
                due_date.format("%B %d, %Y")
            ),
            kind: NotificationType::Warning,
        }
    }
}
