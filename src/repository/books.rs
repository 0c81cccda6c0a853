//! Books repository for catalog and inventory operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookCondition, BookQuery, CreateBook, UpdateBook},
        loan::LoanStatus,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search the catalog with pagination, ordered by title
    pub async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let per_page = query.per_page();
        let offset = query.offset();

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(format!("%{}%", search));
            conditions.push(format!(
                "(title ILIKE ${n} OR author ILIKE ${n} OR isbn ILIKE ${n})",
                n = params.len()
            ));
        }

        if let Some(subject) = query.subject.as_deref().filter(|s| !s.is_empty()) {
            params.push(subject.to_string());
            conditions.push(format!("subject = ${}", params.len()));
        }

        match query.status.as_deref() {
            Some("available") => conditions.push("available_copies > 0".to_string()),
            Some("borrowed") => conditions.push("available_copies < total_copies".to_string()),
            _ => {}
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) FROM books {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_builder = count_builder.bind(param);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT * FROM books {} ORDER BY title, id LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut select_builder = sqlx::query_as::<_, Book>(&select_query);
        for param in &params {
            select_builder = select_builder.bind(param);
        }
        let books = select_builder.fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Number of copies currently out on loan
    pub async fn count_borrowed(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowings WHERE book_id = $1 AND status = $2",
        )
        .bind(id)
        .bind(LoanStatus::Borrowed)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let (total, available) = book.copies()?;

        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                title, author, isbn, subject, description, total_copies, available_copies,
                shelf_location, condition, publication_year, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.subject)
        .bind(&book.description)
        .bind(total)
        .bind(available)
        .bind(&book.shelf_location)
        .bind(book.condition.unwrap_or(BookCondition::Good))
        .bind(book.publication_year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "A book with this ISBN already exists"))
    }

    /// Partial update; a new total shifts the available count by the same delta
    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let (total, available) = match data.total_copies {
            Some(new_total) => (new_total, current.resize(new_total)?),
            None => (current.total_copies, current.available_copies),
        };

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($1, title),
                author = COALESCE($2, author),
                isbn = COALESCE($3, isbn),
                subject = COALESCE($4, subject),
                description = COALESCE($5, description),
                total_copies = $6,
                available_copies = $7,
                shelf_location = COALESCE($8, shelf_location),
                condition = COALESCE($9, condition),
                publication_year = COALESCE($10, publication_year)
            WHERE id = $11
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.isbn)
        .bind(&data.subject)
        .bind(&data.description)
        .bind(total)
        .bind(available)
        .bind(&data.shelf_location)
        .bind(data.condition)
        .bind(data.publication_year)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "A book with this ISBN already exists"))?;

        tx.commit().await?;
        Ok(book)
    }

    /// Delete a book that never circulated
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let has_history: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM borrowings WHERE book_id = $1)
                OR EXISTS(SELECT 1 FROM reservations WHERE book_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if has_history {
            return Err(AppError::Conflict(
                "Book has circulation history and cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
