use crate::domain_model::{Claims, TokenKind};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("token malformed")]
    Malformed,
    #[error("token signature invalid")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("key material rejected: {0}")]
    Key(String),
}

/// Signs and verifies compact claim-sets with a pinned algorithm and key.
pub trait CredentialSigner: Send + Sync {
    fn sign(&self, claims: &Claims) -> Result<String, SignerError>;

    /// Checks signature, expiry, issuer, audience and that the token is of `kind`.
    fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, SignerError>;
}
