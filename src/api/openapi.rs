//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, circulation, dashboard, fines, health, users, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulation API",
        version = "1.0.0",
        description = "Library circulation REST API: catalog, loans, reservations, fines and notifications"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::admin_login,
        auth::logout,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Circulation
        circulation::borrow,
        circulation::return_book,
        circulation::renew,
        circulation::reserve,
        circulation::sweep,
        // Fines
        fines::list_fines,
        fines::pay_fine,
        fines::waive_fine,
        // Dashboards
        dashboard::user_dashboard,
        dashboard::mark_notification_read,
        dashboard::admin_dashboard,
        dashboard::stats,
        dashboard::circulation_report,
        // Users
        users::list_users,
        users::update_status,
        users::update_max_books,
    ),
    components(
        schemas(
            MessageResponse,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::AdminLoginRequest,
            auth::AdminLoginResponse,
            crate::models::patron::RegisterPatron,
            crate::models::patron::PatronSummary,
            crate::models::patron::PatronType,
            crate::models::patron::PatronStatus,
            crate::models::admin::AdminRole,
            // Books
            books::BookCreatedResponse,
            crate::models::book::Book,
            crate::models::book::BookCondition,
            crate::models::book::BookDetails,
            crate::models::book::BookPage,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Circulation
            circulation::BookRequest,
            circulation::ReturnRequest,
            circulation::BorrowResponse,
            circulation::ReturnResponse,
            circulation::RenewResponse,
            circulation::ReserveResponse,
            crate::services::circulation::SweepReport,
            crate::models::loan::LoanStatus,
            crate::models::reservation::ReservationWithBook,
            // Fines
            fines::FinesResponse,
            crate::models::fine::FineDetails,
            crate::models::fine::FineReason,
            // Dashboards
            crate::models::dashboard::UserDashboard,
            crate::models::dashboard::UserDashboardStats,
            crate::models::dashboard::BorrowingEntry,
            crate::models::dashboard::AdminDashboard,
            crate::models::dashboard::AdminStats,
            crate::models::dashboard::SubjectCount,
            crate::models::dashboard::RecentTransaction,
            crate::models::dashboard::OverdueLoan,
            crate::models::dashboard::DashboardStats,
            crate::models::dashboard::CirculationReport,
            crate::models::dashboard::PopularBook,
            crate::models::notification::Notification,
            crate::models::notification::NotificationType,
            // Users
            users::PatronListResponse,
            users::PatronUpdatedResponse,
            crate::models::patron::PatronListEntry,
            crate::models::patron::UpdatePatronStatus,
            crate::models::patron::UpdateMaxBooks,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "books", description = "Catalog"),
        (name = "circulation", description = "Borrow, return, renew and reserve"),
        (name = "fines", description = "Fine management"),
        (name = "dashboard", description = "Dashboards and reports"),
        (name = "users", description = "Patron management")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_circulation_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/api/borrow", "/api/return", "/api/renew", "/api/reserve"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(doc
            .components
            .as_ref()
            .map(|c| c.security_schemes.contains_key("bearer_auth"))
            .unwrap_or(false));
    }
}
