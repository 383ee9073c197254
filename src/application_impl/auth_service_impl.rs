use crate::application_port::*;
use crate::domain_port::*;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;
use tracing::info;

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        // CPU-bound; runs on the blocking pool.
        tokio::task::spawn_blocking(move || {
            let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AuthError::InternalError(e.to_string()))
        })
        .await
        .map_err(|e| AuthError::InternalError(e.to_string()))?
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&password_hash)
                .map_err(|e| AuthError::InternalError(format!("invalid PHC hash: {e}")))?;
            match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(_) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(AuthError::InternalError(format!("verify error: {e}"))),
            }
        })
        .await
        .map_err(|e| AuthError::InternalError(e.to_string()))?
    }
}

pub struct RealAuthService {
    account_repo: Arc<dyn AccountRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_service: Arc<dyn TokenService>,
    min_password_len: usize,
}

impl RealAuthService {
    pub fn new(
        account_repo: Arc<dyn AccountRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_service: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            account_repo,
            credential_hasher,
            token_service,
            min_password_len: 8,
        }
    }

    fn validate_register(&self, input: &RegisterInput) -> Result<(), AuthError> {
        if input.name.trim().is_empty() {
            return Err(AuthError::Validation("name is required".to_string()));
        }
        if !input.email.contains('@') {
            return Err(AuthError::Validation("email is invalid".to_string()));
        }
        if input.password.len() < self.min_password_len {
            return Err(AuthError::Validation(format!(
                "password must be at least {} characters",
                self.min_password_len
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn register(&self, request: RegisterInput) -> Result<AuthOutcome, AuthError> {
        self.validate_register(&request)?;

        let password_hash = self.credential_hasher.hash_password(&request.password).await?;
        let record = self
            .account_repo
            .create(request.name.trim(), request.email.trim(), &password_hash)
            .await?;
        info!(user_id = %record.user_id, "registered user");

        let tokens = self.token_service.issue_pair(record.user_id).await?;
        Ok(AuthOutcome {
            user: record.profile(),
            tokens,
        })
    }

    async fn login(&self, request: LoginInput) -> Result<AuthOutcome, AuthError> {
        let LoginInput { email, password } = request;

        let record = self
            .account_repo
            .get_by_email(email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = self
            .credential_hasher
            .verify_password(&password, &record.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.token_service.issue_pair(record.user_id).await?;
        info!(user_id = %record.user_id, "user logged in");
        Ok(AuthOutcome {
            user: record.profile(),
            tokens,
        })
    }
}
