//! Staff accounts repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::admin::{Admin, AdminRole},
};

#[derive(Clone)]
pub struct AdminsRepository {
    pool: Pool<Postgres>,
}

impl AdminsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(admin)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
        role: AdminRole,
    ) -> AppResult<Admin> {
        sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (username, password_hash, email, role, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Admin already exists"))
    }
}
