//! Credential verification against the seeded user table.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hive_core::types::{Role, User};
use hive_core::{CoreError, CoreResult};
use uuid::Uuid;

use crate::repos::UserRepo;
use crate::retry::bounded;

/// A staff account to seed at startup.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub display_name: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepo>,
    op_timeout: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepo>, op_timeout: Duration) -> Self {
        Self { users, op_timeout }
    }

    /// Hash and insert the configured accounts. Duplicate emails conflict.
    pub async fn seed(&self, seeds: Vec<SeedUser>) -> CoreResult<()> {
        for seed in seeds {
            let password_hash = bcrypt::hash(&seed.password, bcrypt::DEFAULT_COST)
                .map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))?;
            let user = User {
                id: Uuid::new_v4(),
                email: seed.email,
                password_hash,
                role: seed.role,
                display_name: seed.display_name,
                is_active: true,
                created_at: Utc::now(),
            };
            tracing::info!(email = user.email, role = user.role.as_str(), "seeded user");
            self.users.insert(user).await?;
        }
        Ok(())
    }

    /// Verify an email/password pair. The same error is returned for an
    /// unknown email, a wrong password and a deactivated account.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> CoreResult<User> {
        let user = bounded(
            "auth.login",
            self.op_timeout,
            self.users.find_by_email(email),
        )
        .await?
        .ok_or_else(|| CoreError::Unauthorized("invalid credentials".into()))?;

        if !user.is_active {
            return Err(CoreError::Unauthorized("invalid credentials".into()));
        }
        let matches = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| CoreError::Internal(format!("password verification failed: {e}")))?;
        if !matches {
            return Err(CoreError::Unauthorized("invalid credentials".into()));
        }
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> CoreResult<User> {
        bounded("auth.get_user", self.op_timeout, self.users.get_required(id)).await
    }
}
