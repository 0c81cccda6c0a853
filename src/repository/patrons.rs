//! Patrons repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::LoanStatus,
        patron::{Patron, PatronListEntry, PatronQuery, PatronStatus, RegisterPatron},
    },
};

#[derive(Clone)]
pub struct PatronsRepository {
    pool: Pool<Postgres>,
}

impl PatronsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get patron by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Patron> {
        sqlx::query_as::<_, Patron>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get patron by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Patron>> {
        let patron = sqlx::query_as::<_, Patron>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(patron)
    }

    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert a new active patron
    pub async fn create(
        &self,
        data: &RegisterPatron,
        password_hash: &str,
        max_books: i32,
    ) -> AppResult<Patron> {
        sqlx::query_as::<_, Patron>(
            r#"
            INSERT INTO users (
                email, password_hash, first_name, last_name, user_type,
                student_id, department, phone, status, max_books, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            RETURNING *
            "#,
        )
        .bind(data.email.trim())
        .bind(password_hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.user_type)
        .bind(&data.student_id)
        .bind(&data.department)
        .bind(&data.phone)
        .bind(PatronStatus::Active)
        .bind(max_books)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Email already registered"))
    }

    /// List patrons with their open loan count
    pub async fn list(&self, query: &PatronQuery) -> AppResult<(Vec<PatronListEntry>, i64)> {
        let per_page = query.per_page();
        let offset = query.offset();

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref search) = query.search {
            params.push(format!("%{}%", search.trim()));
            conditions.push(format!(
                "(u.first_name ILIKE ${n} OR u.last_name ILIKE ${n} OR u.email ILIKE ${n})",
                n = params.len()
            ));
        }

        if let Some(status) = query.status {
            params.push(status.as_str().to_string());
            conditions.push(format!("u.status = ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) FROM users u {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_builder = count_builder.bind(param);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            r#"
            SELECT u.id, u.email, u.first_name, u.last_name, u.user_type, u.status, u.max_books,
                   (SELECT COUNT(*) FROM borrowings l WHERE l.user_id = u.id AND l.status = '{}') as borrowed_count,
                   u.created_at
            FROM users u
            {}
            ORDER BY u.created_at DESC, u.id DESC
            LIMIT {} OFFSET {}
            "#,
            LoanStatus::Borrowed,
            where_clause,
            per_page,
            offset
        );

        let mut select_builder = sqlx::query_as::<_, PatronListEntry>(&select_query);
        for param in &params {
            select_builder = select_builder.bind(param);
        }
        let patrons = select_builder.fetch_all(&self.pool).await?;

        Ok((patrons, total))
    }

    pub async fn update_status(&self, id: i32, status: PatronStatus) -> AppResult<Patron> {
        sqlx::query_as::<_, Patron>("UPDATE users SET status = $1 WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn update_max_books(&self, id: i32, max_books: i32) -> AppResult<Patron> {
        sqlx::query_as::<_, Patron>("UPDATE users SET max_books = $1 WHERE id = $2 RETURNING *")
            .bind(max_books)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }
}
