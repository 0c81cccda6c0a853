//! Business logic services

pub mod auth;
pub mod catalog;
pub mod circulation;
pub mod dashboard;
pub mod fines;
pub mod users;

use crate::{config::AppConfig, repository::Repository};

use self::circulation::CirculationPolicy;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub circulation: circulation::CirculationService,
    pub dashboard: dashboard::DashboardService,
    pub fines: fines::FinesService,
    pub users: users::UsersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let policy = CirculationPolicy::from(&config.circulation);

        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone(), policy.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            circulation: circulation::CirculationService::new(repository.clone(), policy),
            dashboard: dashboard::DashboardService::new(repository.clone()),
            fines: fines::FinesService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            repository,
        }
    }

    /// Database round-trip for the readiness probe
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.ping().await
    }
}
