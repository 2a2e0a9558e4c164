//! Registration, login and profile lookup
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::ServiceError;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::models::user::{CreateUser, User};

const BAD_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates an account
    ///
    /// # Errors
    ///
    /// - `Validation` when the password is too weak
    /// - `Conflict` when a live account already uses the email
    pub async fn register(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let email = normalize_email(email);
        validate_password_strength(password).map_err(ServiceError::Validation)?;

        if User::find_by_email(&self.pool, &email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = User::create(&self.pool, CreateUser { email, password_hash })
            .await
            .map_err(|e| match ServiceError::from(e) {
                ServiceError::Conflict(_) => {
                    ServiceError::Conflict("Email already registered".to_string())
                }
                other => other,
            })?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks credentials; unknown email and wrong password fail the same way
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let email = normalize_email(email);

        let Some(user) = User::find_by_email(&self.pool, &email).await? else {
            warn!("Login attempt for unknown email");
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User, ServiceError> {
        User::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
