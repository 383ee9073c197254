use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use tracing::debug;

/// Resolves effective permissions on every call; there is no cache to go stale.
pub struct RealPermissionService {
    rbac_repo: Arc<dyn RbacRepo>,
}

impl RealPermissionService {
    pub fn new(rbac_repo: Arc<dyn RbacRepo>) -> Self {
        Self { rbac_repo }
    }
}

#[async_trait::async_trait]
impl PermissionService for RealPermissionService {
    async fn resolve(&self, user_id: UserId) -> Result<PermissionSet, PermissionError> {
        let codes: PermissionSet = self
            .rbac_repo
            .permission_codes_for_user(user_id)
            .await?
            .into_iter()
            .collect();
        debug!(%user_id, count = codes.len(), "resolved permissions");
        Ok(codes)
    }

    async fn has_permission(
        &self,
        user_id: UserId,
        code: &PermissionCode,
    ) -> Result<bool, PermissionError> {
        Ok(self.resolve(user_id).await?.contains(code))
    }
}
