use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use secrecy::Secret;
use uuid::Uuid;

use gridauth_core::{
    Email, Password, TwoFactorMethod, User, UserStore, UserStoreError,
};

use crate::auth::{compute_password_hash, verify_password_hash};

/// Dashmap-backed user store for tests and local runs. Passwords are
/// argon2-hashed exactly like the Postgres store's.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<DashMap<Uuid, User>>,
    methods: Arc<DashMap<Uuid, Vec<TwoFactorMethod>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user with a freshly hashed password.
    pub async fn register(
        &self,
        mut user: User,
        password: Password,
    ) -> Result<User, UserStoreError> {
        user.password_hash = compute_password_hash(password)
            .await
            .map_err(UserStoreError::UnexpectedError)?;
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn add_two_factor_method(&self, method: TwoFactorMethod) {
        self.methods
            .entry(method.user_id)
            .or_default()
            .push(method);
    }

    pub fn update_user<F: FnOnce(&mut User)>(&self, user_id: Uuid, f: F) {
        if let Some(mut entry) = self.users.get_mut(&user_id) {
            f(&mut entry);
        }
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        self.users
            .iter()
            .find(|entry| &entry.email == email)
            .map(|entry| entry.clone())
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<User, UserStoreError> {
        self.users
            .get(&user_id)
            .map(|entry| entry.clone())
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn verify_credentials(
        &self,
        email: &Email,
        password: &Secret<String>,
    ) -> Result<User, UserStoreError> {
        let user = self.find_by_email(email).await?;

        verify_password_hash(user.password_hash.clone(), password.clone())
            .await
            .map_err(|_| UserStoreError::IncorrectPassword)?;

        Ok(user)
    }

    async fn record_login_success(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), UserStoreError> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or(UserStoreError::UserNotFound)?;
        user.failed_login_attempts = 0;
        user.last_login_at = Some(at);
        Ok(())
    }

    async fn record_login_failure(&self, user_id: Uuid) -> Result<(), UserStoreError> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or(UserStoreError::UserNotFound)?;
        user.failed_login_attempts += 1;
        Ok(())
    }

    async fn set_password(
        &self,
        user_id: Uuid,
        new_password: Password,
        changed_at: DateTime<Utc>,
    ) -> Result<(), UserStoreError> {
        let hash = compute_password_hash(new_password)
            .await
            .map_err(UserStoreError::UnexpectedError)?;

        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or(UserStoreError::UserNotFound)?;
        user.password_hash = hash;
        user.password_changed_at = Some(changed_at);
        Ok(())
    }

    async fn two_factor_methods(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<TwoFactorMethod>, UserStoreError> {
        Ok(self
            .methods
            .get(&user_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }
}
