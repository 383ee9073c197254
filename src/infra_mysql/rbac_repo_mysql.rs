use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::MySqlPool;

pub struct MySqlRbacRepo {
    pool: MySqlPool,
}

impl MySqlRbacRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRbacRepo { pool }
    }
}

#[async_trait::async_trait]
impl RbacRepo for MySqlRbacRepo {
    async fn role_ids_for_user(&self, user_id: UserId) -> Result<Vec<RoleId>, PermissionError> {
        sqlx::query_scalar::<_, RoleId>("SELECT role_id FROM user_roles WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PermissionError::Store(format!("query user roles: {e}")))
    }

    async fn permission_codes_for_role(
        &self,
        role_id: RoleId,
    ) -> Result<Vec<PermissionCode>, PermissionError> {
        sqlx::query_scalar::<_, PermissionCode>(
            r#"
SELECT p.code
FROM permissions p
INNER JOIN role_permissions rp ON rp.permission_id = p.id
WHERE rp.role_id = ?
"#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PermissionError::Store(format!("query role permissions: {e}")))
    }

    async fn permission_codes_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PermissionCode>, PermissionError> {
        sqlx::query_scalar::<_, PermissionCode>(
            r#"
SELECT DISTINCT p.code
FROM permissions p
INNER JOIN role_permissions rp ON rp.permission_id = p.id
INNER JOIN user_roles ur ON ur.role_id = rp.role_id
WHERE ur.user_id = ?
"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PermissionError::Store(format!("query user permissions: {e}")))
    }
}
