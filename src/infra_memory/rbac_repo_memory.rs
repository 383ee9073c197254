use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use std::collections::BTreeSet;

/// Role assignments held in memory. Mutations are visible to the next read.
#[derive(Default)]
pub struct MemoryRbacRepo {
    user_roles: DashMap<UserId, BTreeSet<RoleId>>,
    role_permissions: DashMap<RoleId, BTreeSet<PermissionCode>>,
}

impl MemoryRbacRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign_role(&self, user_id: UserId, role_id: RoleId) {
        self.user_roles.entry(user_id).or_default().insert(role_id);
    }

    pub fn revoke_role(&self, user_id: UserId, role_id: RoleId) {
        if let Some(mut roles) = self.user_roles.get_mut(&user_id) {
            roles.remove(&role_id);
        }
    }

    pub fn grant(&self, role_id: RoleId, code: impl Into<PermissionCode>) {
        self.role_permissions
            .entry(role_id)
            .or_default()
            .insert(code.into());
    }

    pub fn revoke(&self, role_id: RoleId, code: &PermissionCode) {
        if let Some(mut codes) = self.role_permissions.get_mut(&role_id) {
            codes.remove(code);
        }
    }
}

#[async_trait::async_trait]
impl RbacRepo for MemoryRbacRepo {
    async fn role_ids_for_user(&self, user_id: UserId) -> Result<Vec<RoleId>, PermissionError> {
        Ok(self
            .user_roles
            .get(&user_id)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn permission_codes_for_role(
        &self,
        role_id: RoleId,
    ) -> Result<Vec<PermissionCode>, PermissionError> {
        Ok(self
            .role_permissions
            .get(&role_id)
            .map(|codes| codes.iter().cloned().collect())
            .unwrap_or_default())
    }
}
