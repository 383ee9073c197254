mod common;

use authgate::application_impl::RealPermissionService;
use authgate::application_port::*;
use authgate::domain_model::*;
use authgate::infra_memory::MemoryRbacRepo;
use common::DownRbac;
use std::sync::Arc;

fn code(s: &str) -> PermissionCode {
    PermissionCode::from(s)
}

#[tokio::test]
async fn assignment_changes_apply_on_the_next_check() {
    let rbac = Arc::new(MemoryRbacRepo::new());
    let permissions = RealPermissionService::new(rbac.clone());
    let user = UserId(42);
    let editor = RoleId(2);
    rbac.grant(editor, USERS_UPDATE);

    assert!(!permissions.has_permission(user, &code(USERS_UPDATE)).await.unwrap());

    rbac.assign_role(user, editor);
    assert!(permissions.has_permission(user, &code(USERS_UPDATE)).await.unwrap());

    rbac.revoke(editor, &code(USERS_UPDATE));
    assert!(!permissions.has_permission(user, &code(USERS_UPDATE)).await.unwrap());

    rbac.grant(editor, USERS_UPDATE);
    rbac.revoke_role(user, editor);
    assert!(!permissions.has_permission(user, &code(USERS_UPDATE)).await.unwrap());
}

#[tokio::test]
async fn overlapping_roles_resolve_to_a_deduplicated_union() {
    let rbac = Arc::new(MemoryRbacRepo::new());
    let permissions = RealPermissionService::new(rbac.clone());
    let user = UserId(9);
    let (viewer, admin) = (RoleId(1), RoleId(3));
    rbac.grant(viewer, USERS_LIST);
    rbac.grant(viewer, USERS_READ);
    rbac.grant(admin, USERS_LIST);
    rbac.grant(admin, ROLES_MANAGE);
    rbac.assign_role(user, viewer);
    rbac.assign_role(user, admin);

    let resolved = permissions.resolve(user).await.unwrap();
    let codes: Vec<&str> = resolved.iter().map(PermissionCode::as_str).collect();
    assert_eq!(codes, vec![ROLES_MANAGE, USERS_LIST, USERS_READ]);
}

#[tokio::test]
async fn rbac_outage_is_an_error_not_a_denial() {
    let permissions = RealPermissionService::new(Arc::new(DownRbac));

    assert!(matches!(
        permissions.has_permission(UserId(1), &code(USERS_LIST)).await,
        Err(PermissionError::Store(_))
    ));
}
