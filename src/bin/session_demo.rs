//! Walk one account through register, rotation, replay, and logout against the
//! in-process backends. Run with `RUST_LOG=session_demo=debug,authgate=debug`.

use authgate::application_impl::*;
use authgate::application_port::*;
use authgate::domain_model::*;
use authgate::infra_memory::*;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("session_demo=info,authgate=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let signer: Arc<dyn CredentialSigner> = Arc::new(JwtRs256Signer::ephemeral(JwtConfig {
        issuer: "authgate.demo".to_string(),
        audience: "authgate-demo-client".to_string(),
    })?);
    let store = Arc::new(MemoryExpiringStore::new());
    let token_service: Arc<dyn TokenService> = Arc::new(RealTokenService::new(
        signer,
        store.clone(),
        TokenServiceConfig::default(),
    ));

    let rbac = Arc::new(MemoryRbacRepo::new());
    let permission_service: Arc<dyn PermissionService> =
        Arc::new(RealPermissionService::new(rbac.clone()));
    let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
        Arc::new(MemoryAccountRepo::new()),
        Arc::new(Argon2PasswordHasher),
        token_service.clone(),
    ));

    let outcome = auth_service
        .register(RegisterInput {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "correct horse battery".to_string(),
        })
        .await?;
    let user_id = outcome.user.id;
    info!(%user_id, "registered");

    let admin = RoleId(1);
    rbac.grant(admin, USERS_LIST);
    rbac.grant(admin, ROLES_MANAGE);
    rbac.assign_role(user_id, admin);
    let permissions = permission_service.resolve(user_id).await?;
    info!(?permissions, "resolved permissions");

    let first = outcome.tokens;
    let second = token_service.rotate_pair(&first.refresh_token).await?;
    info!(
        old_access = ?token_service.verify_access(&first.access_token).await,
        new_access = ?token_service.verify_access(&second.access_token).await,
        "rotated"
    );

    let replay = token_service.rotate_pair(&first.refresh_token).await;
    info!(?replay, "replayed the consumed refresh token");

    token_service
        .revoke(&second.access_token, Some(&second.refresh_token))
        .await?;
    info!(
        access = ?token_service.verify_access(&second.access_token).await,
        rotate = ?token_service.rotate_pair(&second.refresh_token).await.map(|_| ()),
        live_records = store.len(),
        "after logout"
    );

    Ok(())
}
