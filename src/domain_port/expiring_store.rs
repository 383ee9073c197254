use std::time::Duration;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

/// Shared key/value store whose entries expire on their own.
///
/// Each call is atomic for its single key. Nothing spans keys.
#[async_trait::async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Write `value` under `key`, replacing any previous entry. `ttl` must be non-zero.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Read and remove in one step. Of two concurrent callers at most one sees the value.
    async fn get_del(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn del(&self, key: &str) -> Result<(), StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;
}
