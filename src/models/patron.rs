//! Patron (student / faculty borrower) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

text_enum! {
    /// Kind of borrower; decides the default borrowing cap at registration
    PatronType {
        Student => "student",
        Faculty => "faculty",
    }
}

text_enum! {
    /// Account status; only active patrons may borrow
    PatronStatus {
        Active => "active",
        Suspended => "suspended",
        Inactive => "inactive",
    }
}

/// Patron row from the `users` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Patron {
    pub id: i32,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: PatronType,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub status: PatronStatus,
    pub max_books: i32,
    pub created_at: DateTime<Utc>,
}

impl Patron {
    pub fn is_active(&self) -> bool {
        self.status == PatronStatus::Active
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn summary(&self) -> PatronSummary {
        PatronSummary {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            user_type: self.user_type,
            max_books: self.max_books,
        }
    }
}

/// Public view of a patron returned on login and in dashboards
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatronSummary {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: PatronType,
    pub max_books: i32,
}

/// Patron entry for the admin user list
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PatronListEntry {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: PatronType,
    pub status: PatronStatus,
    pub max_books: i32,
    pub borrowed_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Patron list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PatronQuery {
    /// Matches name or email (case-insensitive)
    pub search: Option<String>,
    pub status: Option<PatronStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PatronQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }
}

/// Self-registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatron {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 50, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required"))]
    pub last_name: String,
    pub user_type: PatronType,
    #[validate(length(max = 20))]
    pub student_id: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Phone is required"))]
    pub phone: String,
}

/// Admin status change request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePatronStatus {
    pub status: PatronStatus,
}

/// Admin borrowing-cap change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMaxBooks {
    #[validate(range(min = 0, max = 100, message = "max_books must be between 0 and 100"))]
    pub max_books: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_payload_uses_camel_case() {
        let payload: RegisterPatron = serde_json::from_value(serde_json::json!({
            "email": "student@university.edu",
            "password": "student123",
            "firstName": "John",
            "lastName": "Doe",
            "userType": "student",
            "studentId": "STU001",
            "phone": "555-0123"
        }))
        .unwrap();

        assert_eq!(payload.user_type, PatronType::Student);
        assert_eq!(payload.student_id.as_deref(), Some("STU001"));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_register_rejects_bad_email() {
        let payload = RegisterPatron {
            email: "not-an-email".to_string(),
            password: "secret123".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            user_type: PatronType::Faculty,
            student_id: None,
            department: Some("Mathematics".to_string()),
            phone: "555-0124".to_string(),
        };

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_max_books_range() {
        assert!(UpdateMaxBooks { max_books: 10 }.validate().is_ok());
        assert!(UpdateMaxBooks { max_books: -1 }.validate().is_err());
    }

    #[test]
    fn test_list_offset_bounds() {
        assert_eq!(PatronQuery::default().offset(), 0);

        let query = PatronQuery {
            page: Some(2),
            per_page: Some(500),
            ..Default::default()
        };
        assert_eq!(query.per_page(), 100);
        assert_eq!(query.offset(), 100);

        let query = PatronQuery {
            page: Some(i64::MAX),
            ..Default::default()
        };
        assert_eq!(query.offset(), i64::MAX);
    }
}
