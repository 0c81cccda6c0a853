//! Fine resolution service

use chrono::Utc;

use crate::{
    error::AppResult,
    models::fine::{Fine, FineDetails, FineStatus},
    repository::Repository,
};

#[derive(Clone)]
pub struct FinesService {
    repository: Repository,
}

impl FinesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_pending(&self) -> AppResult<Vec<FineDetails>> {
        self.repository.fines.list_pending().await
    }

    pub async fn pay(&self, fine_id: i32) -> AppResult<Fine> {
        let fine = self
            .repository
            .fines
            .resolve(fine_id, FineStatus::Paid, Utc::now())
            .await?;
        tracing::info!(fine_id, amount = %fine.amount, "Fine paid");
        Ok(fine)
    }

    pub async fn waive(&self, fine_id: i32) -> AppResult<Fine> {
        let fine = self
            .repository
            .fines
            .resolve(fine_id, FineStatus::Waived, Utc::now())
            .await?;
        tracing::info!(fine_id, amount = %fine.amount, "Fine waived");
        Ok(fine)
    }
}
