//! Patron account management for staff

use validator::Validate;

use crate::{
    error::AppResult,
    models::patron::{Patron, PatronListEntry, PatronQuery, PatronStatus, UpdateMaxBooks},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &PatronQuery) -> AppResult<(Vec<PatronListEntry>, i64)> {
        self.repository.patrons.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Patron> {
        self.repository.patrons.get_by_id(id).await
    }

    pub async fn update_status(&self, id: i32, status: PatronStatus) -> AppResult<Patron> {
        let patron = self.repository.patrons.update_status(id, status).await?;
        tracing::info!(patron_id = id, status = %status, "Patron status changed");
        Ok(patron)
    }

    pub async fn update_max_books(&self, id: i32, request: UpdateMaxBooks) -> AppResult<Patron> {
        request.validate()?;
        let patron = self
            .repository
            .patrons
            .update_max_books(id, request.max_books)
            .await?;
        tracing::info!(patron_id = id, max_books = patron.max_books, "Patron borrowing cap changed");
        Ok(patron)
    }
}
