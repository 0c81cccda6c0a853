//! API handlers for the circulation REST endpoints

pub mod auth;
pub mod books;
pub mod circulation;
pub mod dashboard;
pub mod fines;
pub mod health;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post, put},
    RequestPartsExt, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{
    error::AppError,
    models::identity::{Claims, Scope},
    AppState,
};

/// Plain `{message}` acknowledgement
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

async fn bearer_claims(parts: &mut Parts, state: &AppState) -> Result<Claims, AppError> {
    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AppError::Authentication("Missing or invalid authorization header".to_string()))?;

    state.services.auth.verify_token(bearer.token())
}

/// Patron identity from a patron-scoped bearer token
#[derive(Debug, Clone)]
pub struct PatronIdentity(pub Claims);

impl PatronIdentity {
    pub fn patron_id(&self) -> i32 {
        self.0.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for PatronIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state).await?;
        if claims.scope != Scope::Patron {
            return Err(AppError::Authorization("Patron login required".to_string()));
        }
        Ok(PatronIdentity(claims))
    }
}

/// Staff identity from an admin-scoped bearer token
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state).await?;
        if claims.scope != Scope::Admin {
            return Err(AppError::Authorization("Admin login required".to_string()));
        }
        Ok(AdminIdentity(claims))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Accounts
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/admin/login", post(auth::admin_login))
        // Catalog
        .route("/books", get(books::list_books))
        .route("/books/:id", get(books::get_book))
        .route("/admin/books", post(books::create_book))
        .route(
            "/admin/books/:id",
            put(books::update_book).delete(books::delete_book),
        )
        // Circulation
        .route("/borrow", post(circulation::borrow))
        .route("/return", post(circulation::return_book))
        .route("/renew", post(circulation::renew))
        .route("/reserve", post(circulation::reserve))
        .route("/admin/sweep", post(circulation::sweep))
        // Fines
        .route("/admin/fines", get(fines::list_fines))
        .route("/admin/fines/:id/pay", post(fines::pay_fine))
        .route("/admin/fines/:id/waive", post(fines::waive_fine))
        // Dashboards and reports
        .route("/user/dashboard", get(dashboard::user_dashboard))
        .route(
            "/user/notifications/:id/read",
            post(dashboard::mark_notification_read),
        )
        .route("/admin/dashboard", get(dashboard::admin_dashboard))
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/admin/reports/circulation", get(dashboard::circulation_report))
        // Patron management
        .route("/admin/users", get(users::list_users))
        .route("/admin/users/:id/status", put(users::update_status))
        .route("/admin/users/:id/max-books", put(users::update_max_books));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api", api)
        .with_state(state)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
