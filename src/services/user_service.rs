use std::collections::BTreeMap;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::database::models::{DashboardStats, User};
use crate::database::{RecordError, SharedStore};

use super::ServiceError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub struct UserService {
    store: SharedStore,
}

impl UserService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Creates an account. Usernames are trimmed and must be unique.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, ServiceError> {
        let username = username.trim();
        let mut field_errors = BTreeMap::new();
        if username.is_empty() {
            field_errors.insert("username".to_string(), "This field is required".to_string());
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            field_errors.insert(
                "password".to_string(),
                format!("Must be at least {} characters", MIN_PASSWORD_LENGTH),
            );
        }
        if !field_errors.is_empty() {
            return Err(RecordError::new("Invalid registration", field_errors).into());
        }

        let password_hash = hash_password(password).map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ServiceError::Validation(RecordError::single("password", "Password could not be processed"))
        })?;
        let user = self.store.create_user(username, &password_hash).await?;
        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Checks credentials. Unknown users and wrong passwords fail identically.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, ServiceError> {
        let Some(user) = self.store.find_user_by_username(username.trim()).await? else {
            tracing::warn!("Login attempt for unknown user '{}'", username.trim());
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };
        if !verify_password(password, &user.password_hash) {
            tracing::warn!("Login attempt with a wrong password for '{}'", user.username);
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        Ok(user)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(self.store.find_user(id).await?)
    }

    pub async fn dashboard(&self, user_id: Uuid) -> Result<DashboardStats, ServiceError> {
        Ok(self.store.dashboard_stats(user_id).await?)
    }
}
