//! Repository layer for database operations

pub mod admins;
pub mod books;
pub mod circulation;
pub mod fines;
pub mod notifications;
pub mod patrons;
pub mod reports;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub admins: admins::AdminsRepository,
    pub books: books::BooksRepository,
    pub circulation: circulation::CirculationRepository,
    pub fines: fines::FinesRepository,
    pub notifications: notifications::NotificationsRepository,
    pub patrons: patrons::PatronsRepository,
    pub reports: reports::ReportsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            admins: admins::AdminsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            circulation: circulation::CirculationRepository::new(pool.clone()),
            fines: fines::FinesRepository::new(pool.clone()),
            notifications: notifications::NotificationsRepository::new(pool.clone()),
            patrons: patrons::PatronsRepository::new(pool.clone()),
            reports: reports::ReportsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database for readiness checks
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
