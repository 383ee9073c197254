use crate::domain_model::{PermissionCode, PermissionSet, UserId};

#[derive(Debug, Clone, thiserror::Error)]
pub enum PermissionError {
    #[error("rbac store error: {0}")]
    Store(String),
}

#[async_trait::async_trait]
pub trait PermissionService: Send + Sync {
    async fn resolve(&self, user_id: UserId) -> Result<PermissionSet, PermissionError>;

    async fn has_permission(
        &self,
        user_id: UserId,
        code: &PermissionCode,
    ) -> Result<bool, PermissionError>;
}
