use crate::api::v1::CookiePolicy;
use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::{DatabaseBackend, Settings, StoreBackend};
use anyhow::{Context, anyhow};
use sqlx::{MySql, Pool};
use std::sync::Arc;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub token_service: Arc<dyn TokenService>,
    pub permission_service: Arc<dyn PermissionService>,
    pub cookie_policy: CookiePolicy,
    pool: Option<Pool<MySql>>,
}

impl Server {
    /// Assemble a server from already-built services. No external resources are owned.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        token_service: Arc<dyn TokenService>,
        permission_service: Arc<dyn PermissionService>,
        cookie_policy: CookiePolicy,
    ) -> Self {
        Self {
            auth_service,
            token_service,
            permission_service,
            cookie_policy,
            pool: None,
        }
    }

    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let signer: Arc<dyn CredentialSigner> = Arc::new(load_signer(settings)?);

        let store: Arc<dyn ExpiringStore> = match settings.store.backend {
            StoreBackend::Redis => Arc::new(
                RedisExpiringStore::connect(
                    &settings.store.dsn,
                    settings.store.call_timeout(),
                    settings.store.retry_backoff(),
                )
                .await
                .context("connecting token store")?,
            ),
            StoreBackend::Memory => {
                warn!("using in-process token store; revocations are not shared between instances");
                Arc::new(MemoryExpiringStore::new())
            }
        };

        let token_service: Arc<dyn TokenService> = Arc::new(RealTokenService::new(
            signer,
            store,
            TokenServiceConfig {
                key_prefix: settings.store.prefix.clone(),
                access_ttl: settings.jwt.access_ttl(),
                refresh_ttl: settings.jwt.refresh_ttl(),
            },
        ));

        let (account_repo, rbac_repo, pool) = match settings.database.backend {
            DatabaseBackend::Mysql => {
                let pool = Pool::<MySql>::connect(&settings.database.dsn)
                    .await
                    .context("connecting database")?;
                let account_repo: Arc<dyn AccountRepo> =
                    Arc::new(MySqlAccountRepo::new(pool.clone()));
                let rbac_repo: Arc<dyn RbacRepo> = Arc::new(MySqlRbacRepo::new(pool.clone()));
                (account_repo, rbac_repo, Some(pool))
            }
            DatabaseBackend::Memory => {
                warn!("using in-process account and role data");
                let account_repo: Arc<dyn AccountRepo> = Arc::new(MemoryAccountRepo::new());
                let rbac_repo: Arc<dyn RbacRepo> = Arc::new(MemoryRbacRepo::new());
                (account_repo, rbac_repo, None)
            }
        };

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            account_repo,
            credential_hasher,
            token_service.clone(),
        ));
        let permission_service: Arc<dyn PermissionService> =
            Arc::new(RealPermissionService::new(rbac_repo));

        info!("server started");

        Ok(Self {
            auth_service,
            token_service,
            permission_service,
            cookie_policy: CookiePolicy::from(&settings.cookie),
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
        info!("server shut down");
    }
}

fn load_signer(settings: &Settings) -> anyhow::Result<JwtRs256Signer> {
    let cfg = JwtConfig {
        issuer: settings.jwt.issuer.clone(),
        audience: settings.jwt.audience.clone(),
    };
    match (&settings.jwt.private_key_path, &settings.jwt.public_key_path) {
        (Some(private_path), Some(public_path)) => {
            let private_pem = std::fs::read(private_path)
                .with_context(|| format!("reading jwt private key {private_path}"))?;
            let public_pem = std::fs::read(public_path)
                .with_context(|| format!("reading jwt public key {public_path}"))?;
            Ok(JwtRs256Signer::from_pem(cfg, &private_pem, &public_pem)?)
        }
        (None, None) => {
            warn!("no jwt key paths configured, generating an ephemeral keypair");
            Ok(JwtRs256Signer::ephemeral(cfg)?)
        }
        _ => Err(anyhow!(
            "jwt.private_key_path and jwt.public_key_path must be set together"
        )),
    }
}
