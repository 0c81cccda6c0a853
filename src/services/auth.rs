//! Authentication service: patron registration, logins and token checks

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::{AuthConfig, BootstrapAdminConfig},
    error::{AppError, AppResult},
    models::{
        admin::{Admin, AdminRole},
        identity::Claims,
        patron::{Patron, RegisterPatron},
    },
    repository::Repository,
};

use super::circulation::CirculationPolicy;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    policy: CirculationPolicy,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig, policy: CirculationPolicy) -> Self {
        Self {
            repository,
            config,
            policy,
        }
    }

    /// Self-registration; the borrowing cap follows the patron type
    pub async fn register(&self, data: RegisterPatron) -> AppResult<Patron> {
        data.validate()?;

        if self.repository.patrons.email_exists(data.email.trim()).await? {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        let password_hash = hash_password(&data.password)?;
        let max_books = self.policy.max_books_for(data.user_type);
        let patron = self
            .repository
            .patrons
            .create(&data, &password_hash, max_books)
            .await?;

        tracing::info!(patron_id = patron.id, user_type = %patron.user_type, "Patron registered");
        Ok(patron)
    }

    /// Patron login; returns a patron-scoped token
    pub async fn login_patron(&self, email: &str, password: &str) -> AppResult<(String, Patron)> {
        let patron = self
            .repository
            .patrons
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !verify_password(&patron.password_hash, password)? {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        if !patron.is_active() {
            return Err(AppError::Authorization(
                "Account is suspended or inactive".to_string(),
            ));
        }

        let token = self.issue(&Claims::for_patron(
            &patron,
            Utc::now(),
            self.config.token_expiration_hours,
        ))?;

        tracing::info!(patron_id = patron.id, "Patron logged in");
        Ok((token, patron))
    }

    /// Staff login; returns an admin-scoped token
    pub async fn login_admin(&self, username: &str, password: &str) -> AppResult<(String, Admin)> {
        let admin = self
            .repository
            .admins
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid admin credentials".to_string()))?;

        if !verify_password(&admin.password_hash, password)? {
            return Err(AppError::Authentication("Invalid admin credentials".to_string()));
        }

        let token = self.issue(&Claims::for_admin(
            &admin,
            Utc::now(),
            self.config.token_expiration_hours,
        ))?;

        tracing::info!(admin_id = admin.id, role = %admin.role, "Admin logged in");
        Ok((token, admin))
    }

    /// Decode and validate a bearer token
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        Claims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))
    }

    /// Create the configured staff account when no admin exists yet
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<Option<Admin>> {
        let Some(BootstrapAdminConfig {
            username,
            password,
            email,
        }) = self.config.bootstrap_admin.as_ref()
        else {
            return Ok(None);
        };

        if self.repository.admins.count().await? > 0 {
            return Ok(None);
        }

        let password_hash = hash_password(password)?;
        let admin = self
            .repository
            .admins
            .create(username, &password_hash, email, AdminRole::SuperAdmin)
            .await?;

        tracing::warn!(username = %admin.username, "Created bootstrap admin account; change its password");
        Ok(Some(admin))
    }

    fn issue(&self, claims: &Claims) -> AppResult<String> {
        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("student123").unwrap();

        assert_ne!(hash, "student123");
        assert!(verify_password(&hash, "student123").unwrap());
        assert!(!verify_password(&hash, "student124").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        assert!(matches!(
            verify_password("not-a-phc-string", "x"),
            Err(AppError::Internal(_))
        ));
    }
}
