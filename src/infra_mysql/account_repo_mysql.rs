use super::util::is_dup_key;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlAccountRepo {
    pool: MySqlPool,
}

impl MySqlAccountRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlAccountRepo { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<AccountRecord, AuthError> {
        let user_id: UserId = row
            .try_get("id")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let name: String = row
            .try_get("name")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let email: String = row
            .try_get("email")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(AccountRecord {
            user_id,
            name,
            email,
            password_hash,
            created_at,
        })
    }

    async fn get_by_id(&self, user_id: UserId) -> Result<AccountRecord, AuthError> {
        let row: MySqlRow = sqlx::query(
            r#"
SELECT id, name, email, password_hash, created_at
FROM users
WHERE id = ?
"#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        Self::row_to_record(row)
    }
}

#[async_trait::async_trait]
impl AccountRepo for MySqlAccountRepo {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<AccountRecord, AuthError> {
        let result = sqlx::query(
            r#"
INSERT INTO users (name, email, password_hash)
VALUES (?, ?, ?)
"#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                AuthError::EmailTaken
            } else {
                AuthError::Store(e.to_string())
            }
        })?;

        let user_id = i64::try_from(result.last_insert_id())
            .map(UserId)
            .map_err(|e| AuthError::Store(e.to_string()))?;
        self.get_by_id(user_id).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<AccountRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, name, email, password_hash, created_at
FROM users
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }
}
