use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;
use uuid::Uuid;

use gridauth_core::{
    Email, MethodKind, Password, TwoFactorMethod, User, UserStore, UserStoreError,
};

use crate::auth::{compute_password_hash, verify_password_hash};

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresUserStore { pool }
    }

    async fn fetch_user(&self, sql: &str, bind: UserKey<'_>) -> Result<User, UserStoreError> {
        let query = sqlx::query(sql);
        let query = match bind {
            UserKey::Email(email) => query.bind(email.as_ref().expose_secret()),
            UserKey::Id(id) => query.bind(id),
        };

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?
            .ok_or(UserStoreError::UserNotFound)?;

        user_from_row(&row)
    }
}

enum UserKey<'a> {
    Email(&'a Email),
    Id(Uuid),
}

const USER_COLUMNS: &str = "id, tenant_id, email, password_hash, role, active, locked_until, \
     failed_login_attempts, last_login_at, password_changed_at";

fn user_from_row(row: &PgRow) -> Result<User, UserStoreError> {
    let email: String = row
        .try_get("email")
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;
    let email =
        Email::parse(&email).map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;
    let password_hash: String = row
        .try_get("password_hash")
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

    let get = |e: sqlx::Error| UserStoreError::UnexpectedError(e.to_string());

    Ok(User {
        id: row.try_get("id").map_err(get)?,
        tenant_id: row.try_get("tenant_id").map_err(get)?,
        email,
        password_hash: Secret::from(password_hash),
        role: row.try_get("role").map_err(get)?,
        active: row.try_get("active").map_err(get)?,
        locked_until: row.try_get("locked_until").map_err(get)?,
        failed_login_attempts: row.try_get("failed_login_attempts").map_err(get)?,
        last_login_at: row.try_get("last_login_at").map_err(get)?,
        password_changed_at: row.try_get("password_changed_at").map_err(get)?,
    })
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[tracing::instrument(name = "Retrieving user by email from PostgreSQL", skip_all)]
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        self.fetch_user(&sql, UserKey::Email(email)).await
    }

    #[tracing::instrument(name = "Retrieving user by id from PostgreSQL", skip_all)]
    async fn find_by_id(&self, user_id: Uuid) -> Result<User, UserStoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        self.fetch_user(&sql, UserKey::Id(user_id)).await
    }

    #[tracing::instrument(name = "Validating user credentials in PostgreSQL", skip_all)]
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

    #[tracing::instrument(name = "Recording login success", skip_all)]
    async fn record_login_success(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), UserStoreError> {
        let result = sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, last_login_at = $2 WHERE id = $1",
        )
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::UserNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Recording login failure", skip_all)]
    async fn record_login_failure(&self, user_id: Uuid) -> Result<(), UserStoreError> {
        let result = sqlx::query(
            "UPDATE users SET failed_login_attempts = failed_login_attempts + 1 WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::UserNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Set new password", skip_all)]
    async fn set_password(
        &self,
        user_id: Uuid,
        new_password: Password,
        changed_at: DateTime<Utc>,
    ) -> Result<(), UserStoreError> {
        let password_hash = compute_password_hash(new_password)
            .await
            .map_err(UserStoreError::UnexpectedError)?;

        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, password_changed_at = $3 WHERE id = $1",
        )
        .bind(user_id)
        .bind(password_hash.expose_secret())
        .bind(changed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::UserNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Listing two-factor methods", skip_all)]
    async fn two_factor_methods(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<TwoFactorMethod>, UserStoreError> {
        let rows = sqlx::query(
            "SELECT user_id, kind, secret, phone_number \
             FROM user_two_factor_methods WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let get = |e: sqlx::Error| UserStoreError::UnexpectedError(e.to_string());
                let kind: String = row.try_get("kind").map_err(get)?;
                Ok(TwoFactorMethod {
                    user_id: row.try_get("user_id").map_err(get)?,
                    kind: MethodKind::from_str(&kind)
                        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?,
                    secret: row.try_get("secret").map_err(get)?,
                    phone_number: row.try_get("phone_number").map_err(get)?,
                })
            })
            .collect()
    }
}
