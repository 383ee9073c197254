use crate::application_port::*;
use crate::domain_model::*;

/// Read access to user→role and role→permission assignments.
#[async_trait::async_trait]
pub trait RbacRepo: Send + Sync {
    async fn role_ids_for_user(&self, user_id: UserId) -> Result<Vec<RoleId>, PermissionError>;

    async fn permission_codes_for_role(
        &self,
        role_id: RoleId,
    ) -> Result<Vec<PermissionCode>, PermissionError>;

    /// Codes reachable from the user through any role. May contain duplicates.
    async fn permission_codes_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PermissionCode>, PermissionError> {
        let mut codes = Vec::new();
        for role_id in self.role_ids_for_user(user_id).await? {
            codes.extend(self.permission_codes_for_role(role_id).await?);
        }
        Ok(codes)
    }
}
