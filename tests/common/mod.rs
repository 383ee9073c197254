#![allow(dead_code)]

use authgate::api::v1::CookiePolicy;
use authgate::application_impl::*;
use authgate::application_port::*;
use authgate::domain_model::*;
use authgate::domain_port::*;
use authgate::infra_memory::*;
use authgate::server::Server;
use std::sync::Arc;
use std::time::Duration;

pub const PRIVATE_PEM: &str = include_str!("../../testdata/jwt_private.pem");
pub const PUBLIC_PEM: &str = include_str!("../../testdata/jwt_public.pem");

pub fn signer() -> Arc<dyn CredentialSigner> {
    let cfg = JwtConfig {
        issuer: "authgate.test".to_string(),
        audience: "authgate-client".to_string(),
    };
    Arc::new(JwtRs256Signer::from_pem(cfg, PRIVATE_PEM.as_bytes(), PUBLIC_PEM.as_bytes()).unwrap())
}

pub fn token_service(store: Arc<dyn ExpiringStore>) -> Arc<dyn TokenService> {
    Arc::new(RealTokenService::new(
        signer(),
        store,
        TokenServiceConfig::default(),
    ))
}

/// A store that is always down.
pub struct DownStore;

#[async_trait::async_trait]
impl ExpiringStore for DownStore {
    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Timeout(Duration::from_millis(500)))
    }

    async fn get_del(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Timeout(Duration::from_millis(500)))
    }

    async fn del(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn exists(&self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::Timeout(Duration::from_millis(500)))
    }
}

/// An RBAC backend that is always down.
pub struct DownRbac;

#[async_trait::async_trait]
impl RbacRepo for DownRbac {
    async fn role_ids_for_user(
        &self,
        _user_id: UserId,
    ) -> Result<Vec<RoleId>, PermissionError> {
        Err(PermissionError::Store("pool timed out".to_string()))
    }

    async fn permission_codes_for_role(
        &self,
        _role_id: RoleId,
    ) -> Result<Vec<PermissionCode>, PermissionError> {
        Err(PermissionError::Store("pool timed out".to_string()))
    }
}

pub struct TestApp {
    pub server: Arc<Server>,
    pub store: Arc<MemoryExpiringStore>,
    pub rbac: Arc<MemoryRbacRepo>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryExpiringStore::new());
    let rbac = Arc::new(MemoryRbacRepo::new());
    let token_service = token_service(store.clone());
    let server = Server::new(
        Arc::new(RealAuthService::new(
            Arc::new(MemoryAccountRepo::new()),
            Arc::new(Argon2PasswordHasher),
            token_service.clone(),
        )),
        token_service,
        Arc::new(RealPermissionService::new(rbac.clone())),
        CookiePolicy {
            path: "/api/v1".to_string(),
            secure: false,
        },
    );
    TestApp {
        server: Arc::new(server),
        store,
        rbac,
    }
}

/// Same wiring, but every RBAC lookup fails.
pub fn test_app_with_rbac_down() -> TestApp {
    let app = test_app();
    let server = Server::new(
        app.server.auth_service.clone(),
        app.server.token_service.clone(),
        Arc::new(RealPermissionService::new(Arc::new(DownRbac))),
        app.server.cookie_policy.clone(),
    );
    TestApp {
        server: Arc::new(server),
        ..app
    }
}
