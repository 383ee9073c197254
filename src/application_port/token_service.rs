use super::SignerError;
use crate::domain_model::{AccessToken, RefreshToken, TokenPair, UserId};
use crate::domain_port::StoreError;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token malformed")]
    Malformed,
    #[error("token signature invalid")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token revoked")]
    Revoked,
    #[error("token not found")]
    NotFound,
    #[error("token store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("token persistence failed: {0}")]
    Persistence(String),
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl TokenError {
    /// True for failures caused by the credential itself rather than infrastructure.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            TokenError::Malformed
                | TokenError::InvalidSignature
                | TokenError::Expired
                | TokenError::Revoked
                | TokenError::NotFound
        )
    }
}

impl From<SignerError> for TokenError {
    fn from(error: SignerError) -> Self {
        match error {
            SignerError::Malformed => TokenError::Malformed,
            SignerError::InvalidSignature => TokenError::InvalidSignature,
            SignerError::Expired => TokenError::Expired,
            SignerError::Signing(e) | SignerError::Key(e) => TokenError::Signing(e),
        }
    }
}

impl From<StoreError> for TokenError {
    fn from(error: StoreError) -> Self {
        TokenError::StoreUnavailable(error.to_string())
    }
}

#[async_trait::async_trait]
pub trait TokenService: Send + Sync {
    /// Mint a fresh access/refresh pair for `user_id` and record it in the store.
    async fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, TokenError>;

    /// Consume a refresh token exactly once and mint its successor pair.
    async fn rotate_pair(&self, refresh_token: &RefreshToken) -> Result<TokenPair, TokenError>;

    /// Logout. Invalid or missing refresh material degrades to access-only revocation.
    async fn revoke(
        &self,
        access_token: &AccessToken,
        refresh_token: Option<&RefreshToken>,
    ) -> Result<(), TokenError>;

    async fn verify_access(&self, access_token: &AccessToken) -> Result<UserId, TokenError>;
}
