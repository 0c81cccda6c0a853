//! Catalog service

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, BookDetails, BookPage, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn search_books(&self, query: &BookQuery) -> AppResult<BookPage> {
        let (books, total) = self.repository.books.list(query).await?;
        Ok(BookPage::new(books, total, query))
    }

    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let borrowed = self.repository.books.count_borrowed(id).await?;
        Ok(BookDetails::new(book, borrowed))
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        let book = self.repository.books.create(&book).await?;
        tracing::info!(book_id = book.id, title = %book.title, "Book added");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        book.validate()?;
        let book = self.repository.books.update(id, &book).await?;
        tracing::info!(
            book_id = book.id,
            total_copies = book.total_copies,
            available_copies = book.available_copies,
            "Book updated"
        );
        Ok(book)
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }
}
