//! Request identity carried in signed tokens
//!
//! Patrons and staff authenticate independently; a token is valid for exactly
//! one of the two scopes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::admin::{Admin, AdminRole};
use super::patron::Patron;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Patron,
    Admin,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Patron id or admin id depending on `scope`
    pub id: i32,
    pub scope: Scope,
    pub role: Option<AdminRole>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn for_patron(patron: &Patron, now: DateTime<Utc>, lifetime_hours: u64) -> Self {
        Self {
            sub: patron.email.clone(),
            id: patron.id,
            scope: Scope::Patron,
            role: None,
            iat: now.timestamp(),
            exp: (now + Duration::hours(lifetime_hours as i64)).timestamp(),
        }
    }

    pub fn for_admin(admin: &Admin, now: DateTime<Utc>, lifetime_hours: u64) -> Self {
        Self {
            sub: admin.username.clone(),
            id: admin.id,
            scope: Scope::Admin,
            role: Some(admin.role),
            iat: now.timestamp(),
            exp: (now + Duration::hours(lifetime_hours as i64)).timestamp(),
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Admin {
        Admin {
            id: 2,
            username: "librarian".to_string(),
            password_hash: String::new(),
            email: "librarian@library.edu".to_string(),
            role: AdminRole::Librarian,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let claims = Claims::for_admin(&admin(), Utc::now(), 1);
        let token = claims.create_token("secret").unwrap();
        let parsed = Claims::from_token(&token, "secret").unwrap();

        assert_eq!(parsed.id, 2);
        assert_eq!(parsed.scope, Scope::Admin);
        assert_eq!(parsed.role, Some(AdminRole::Librarian));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = Claims::for_admin(&admin(), Utc::now(), 1)
            .create_token("secret")
            .unwrap();
        assert!(Claims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = Utc::now() - Duration::hours(5);
        let token = Claims::for_admin(&admin(), issued, 1)
            .create_token("secret")
            .unwrap();
        assert!(Claims::from_token(&token, "secret").is_err());
    }
}
