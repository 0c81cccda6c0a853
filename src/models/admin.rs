//! Library staff accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

text_enum! {
    AdminRole {
        Librarian => "librarian",
        Admin => "admin",
        SuperAdmin => "super_admin",
    }
}

/// Staff row from the `admins` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Admin {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}
