//! Book model and inventory counts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

text_enum! {
    BookCondition {
        Good => "good",
        Damaged => "damaged",
        Lost => "lost",
    }
}

/// Book row; `available_copies` is kept within `0..=total_copies`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub shelf_location: Option<String>,
    pub condition: BookCondition,
    pub publication_year: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Subject split into tags ("Fiction, Classic" -> ["Fiction", "Classic"])
    pub fn tags(&self) -> Vec<String> {
        match self.subject.as_deref().map(str::trim) {
            Some(subject) if !subject.is_empty() => subject
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
            _ => vec!["General".to_string()],
        }
    }

    /// Available count after changing the total; copies on loan stay on loan.
    pub fn resize(&self, new_total: i32) -> AppResult<i32> {
        if new_total < 0 {
            return Err(AppError::Validation("total_copies cannot be negative".to_string()));
        }
        let available = self.available_copies + (new_total - self.total_copies);
        if available < 0 {
            return Err(AppError::BusinessRule(format!(
                "Cannot reduce total copies to {}: {} copies are currently borrowed",
                new_total,
                self.total_copies - self.available_copies
            )));
        }
        Ok(available)
    }
}

/// Book with circulation details for the detail page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub borrowed_copies: i64,
    /// "available" or "borrowed"
    pub status: String,
    pub tags: Vec<String>,
}

impl BookDetails {
    pub fn new(book: Book, borrowed_copies: i64) -> Self {
        let status = if book.is_available() { "available" } else { "borrowed" };
        Self {
            tags: book.tags(),
            status: status.to_string(),
            borrowed_copies,
            book,
        }
    }
}

/// Catalog query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive match on title, author or ISBN
    pub search: Option<String>,
    /// Exact subject match
    pub subject: Option<String>,
    /// "available" or "borrowed"
    pub status: Option<String>,
}

impl BookQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(12).clamp(1, 100)
    }

    /// Row offset; saturates so a huge page number reads past the end
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }
}

/// One page of catalog results
#[derive(Debug, Serialize, ToSchema)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
}

impl BookPage {
    pub fn new(books: Vec<Book>, total: i64, query: &BookQuery) -> Self {
        let per_page = query.per_page();
        Self {
            books,
            total,
            pages: (total + per_page - 1) / per_page,
            current_page: query.page(),
        }
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "Author is required"))]
    pub author: String,
    #[validate(length(max = 20))]
    pub isbn: Option<String>,
    #[validate(length(max = 100))]
    pub subject: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "total_copies cannot be negative"))]
    pub total_copies: Option<i32>,
    pub available_copies: Option<i32>,
    #[validate(length(max = 50))]
    pub shelf_location: Option<String>,
    pub condition: Option<BookCondition>,
    pub publication_year: Option<i32>,
}

impl CreateBook {
    /// (total, available): total defaults to 1, available to total
    pub fn copies(&self) -> AppResult<(i32, i32)> {
        let total = self.total_copies.unwrap_or(1);
        let available = self.available_copies.unwrap_or(total);
        if available < 0 || available > total {
            return Err(AppError::Validation(format!(
                "available_copies must be between 0 and {}",
                total
            )));
        }
        Ok((total, available))
    }
}

/// Update book request; `available_copies` follows `total_copies`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub author: Option<String>,
    #[validate(length(max = 20))]
    pub isbn: Option<String>,
    #[validate(length(max = 100))]
    pub subject: Option<String>,
    pub description: Option<String>,
    pub total_copies: Option<i32>,
    #[validate(length(max = 50))]
    pub shelf_location: Option<String>,
    pub condition: Option<BookCondition>,
    pub publication_year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(total: i32, available: i32) -> Book {
        Book {
            id: 1,
            title: "Clean Code".to_string(),
            author: "Robert C. Martin".to_string(),
            isbn: Some("978-0132350884".to_string()),
            subject: Some("Technology, Software Engineering".to_string()),
            description: None,
            total_copies: total,
            available_copies: available,
            shelf_location: Some("T-MAR".to_string()),
            condition: BookCondition::Good,
            publication_year: Some(2008),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_resize_keeps_loans_outstanding() {
        // 3 copies, 1 on loan
        let b = book(3, 2);
        assert_eq!(b.resize(5).unwrap(), 4);
        assert_eq!(b.resize(1).unwrap(), 0);
        assert!(matches!(b.resize(0), Err(AppError::BusinessRule(_))));
        assert!(matches!(b.resize(-1), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_tags_from_subject() {
        assert_eq!(book(1, 1).tags(), vec!["Technology", "Software Engineering"]);

        let mut untagged = book(1, 1);
        untagged.subject = None;
        assert_eq!(untagged.tags(), vec!["General"]);
    }

    #[test]
    fn test_details_status() {
        assert_eq!(BookDetails::new(book(2, 0), 2).status, "borrowed");
        assert_eq!(BookDetails::new(book(2, 1), 1).status, "available");
    }

    #[test]
    fn test_create_copies_defaults_and_bounds() {
        let mut request = CreateBook {
            title: "1984".to_string(),
            author: "George Orwell".to_string(),
            isbn: None,
            subject: None,
            description: None,
            total_copies: Some(4),
            available_copies: None,
            shelf_location: None,
            condition: None,
            publication_year: Some(1949),
        };
        assert_eq!(request.copies().unwrap(), (4, 4));

        request.available_copies = Some(5);
        assert!(request.copies().is_err());

        request.total_copies = None;
        request.available_copies = None;
        assert_eq!(request.copies().unwrap(), (1, 1));
    }

    #[test]
    fn test_page_count() {
        let query = BookQuery {
            per_page: Some(12),
            ..Default::default()
        };
        assert_eq!(BookPage::new(Vec::new(), 25, &query).pages, 3);
        assert_eq!(BookPage::new(Vec::new(), 0, &query).pages, 0);
        assert_eq!(BookPage::new(Vec::new(), 12, &query).current_page, 1);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        let query = BookQuery {
            page: Some(3),
            per_page: Some(12),
            ..Default::default()
        };
        assert_eq!(query.offset(), 24);

        let query = BookQuery {
            page: Some(i64::MAX),
            ..Default::default()
        };
        assert_eq!(query.offset(), i64::MAX);

        let query = BookQuery {
            page: Some(-5),
            ..Default::default()
        };
        assert_eq!(query.offset(), 0);
    }
}
