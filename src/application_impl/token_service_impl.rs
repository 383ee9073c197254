use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Shared by every server instance that honors the same tokens.
    pub key_prefix: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        TokenServiceConfig {
            key_prefix: "auth".to_string(),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }
}

/// Store key layout for token state.
#[derive(Debug, Clone)]
struct KeySpace {
    prefix: String,
}

impl KeySpace {
    fn access(&self, jti: &TokenId) -> String {
        format!("{}:access:{}", self.prefix, jti)
    }

    fn refresh(&self, jti: &TokenId) -> String {
        format!("{}:refresh:{}", self.prefix, jti)
    }

    fn refresh_link(&self, jti: &TokenId) -> String {
        format!("{}:refresh_link:{}", self.prefix, jti)
    }

    fn revoked(&self, jti: &TokenId) -> String {
        format!("{}:revoked:{}", self.prefix, jti)
    }
}

pub struct RealTokenService {
    signer: Arc<dyn CredentialSigner>,
    store: Arc<dyn ExpiringStore>,
    keys: KeySpace,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl RealTokenService {
    pub fn new(
        signer: Arc<dyn CredentialSigner>,
        store: Arc<dyn ExpiringStore>,
        config: TokenServiceConfig,
    ) -> Self {
        Self {
            signer,
            store,
            keys: KeySpace {
                prefix: config.key_prefix,
            },
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    fn persistence(e: StoreError) -> TokenError {
        TokenError::Persistence(e.to_string())
    }

    /// Denylist an access `jti` until `expires_at`. Nothing to do once it has lapsed.
    async fn revoke_access_jti(
        &self,
        jti: &TokenId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), TokenError> {
        let Some(remaining) = (expires_at - Utc::now())
            .to_std()
            .ok()
            .filter(|d| !d.is_zero())
        else {
            debug!(%jti, "access token already lapsed, no revocation entry needed");
            return Ok(());
        };
        self.store
            .set_ex(&self.keys.revoked(jti), "1", remaining)
            .await?;
        Ok(())
    }

    /// Drop a refresh lineage presented at logout. Invalid material, or a token owned by
    /// someone other than `owner` when the caller is known, is ignored.
    async fn discard_refresh(
        &self,
        owner: Option<UserId>,
        refresh_token: &RefreshToken,
    ) -> Result<(), TokenError> {
        let claims = match self.signer.verify(&refresh_token.0, TokenKind::Refresh) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "logout: ignoring unusable refresh token");
                return Ok(());
            }
        };
        if let Some(owner) = owner.filter(|owner| *owner != claims.subject) {
            warn!(%owner, refresh_owner = %claims.subject, "logout: refresh token belongs to another user");
            return Ok(());
        }
        self.store.del(&self.keys.refresh(&claims.jti)).await?;
        self.store.del(&self.keys.refresh_link(&claims.jti)).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TokenService for RealTokenService {
    async fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        let access = Claims::new(user_id, TokenKind::Access, now, self.access_ttl);
        let refresh = Claims::new(user_id, TokenKind::Refresh, now, self.refresh_ttl);

        let access_token = self.signer.sign(&access)?;
        let refresh_token = self.signer.sign(&refresh)?;

        let uid = user_id.to_string();
        // The refresh record goes last: until it exists the pair cannot be rotated.
        self.store
            .set_ex(&self.keys.access(&access.jti), &uid, self.access_ttl)
            .await
            .map_err(Self::persistence)?;
        self.store
            .set_ex(
                &self.keys.refresh_link(&refresh.jti),
                &access.jti.to_string(),
                self.refresh_ttl,
            )
            .await
            .map_err(Self::persistence)?;
        self.store
            .set_ex(&self.keys.refresh(&refresh.jti), &uid, self.refresh_ttl)
            .await
            .map_err(Self::persistence)?;

        info!(%user_id, access_jti = %access.jti, refresh_jti = %refresh.jti, "issued token pair");

        Ok(TokenPair {
            access_token: AccessToken(access_token),
            refresh_token: RefreshToken(refresh_token),
            access_token_expires_at: access.expires_at,
            refresh_token_expires_at: refresh.expires_at,
        })
    }

    async fn rotate_pair(&self, refresh_token: &RefreshToken) -> Result<TokenPair, TokenError> {
        let claims = self.signer.verify(&refresh_token.0, TokenKind::Refresh)?;

        // Check-and-consume in one store call; a replay or a racing rotation finds nothing.
        let owner = self
            .store
            .get_del(&self.keys.refresh(&claims.jti))
            .await?
            .ok_or(TokenError::NotFound)?;
        if owner.parse::<UserId>().ok() != Some(claims.subject) {
            warn!(refresh_jti = %claims.jti, stored = %owner, subject = %claims.subject, "refresh record owner mismatch");
            self.store.del(&self.keys.refresh_link(&claims.jti)).await?;
            return Err(TokenError::NotFound);
        }

        if let Some(sibling) = self
            .store
            .get_del(&self.keys.refresh_link(&claims.jti))
            .await?
        {
            match sibling.parse::<TokenId>() {
                Ok(access_jti) => {
                    let sibling_expiry = claims.issued_at + self.access_ttl;
                    self.revoke_access_jti(&access_jti, sibling_expiry).await?;
                }
                Err(e) => warn!(refresh_jti = %claims.jti, error = %e, "unparseable rotation link"),
            }
        }

        let pair = self.issue_pair(claims.subject).await?;
        info!(user_id = %claims.subject, old_refresh_jti = %claims.jti, "rotated token pair");
        Ok(pair)
    }

    async fn revoke(
        &self,
        access_token: &AccessToken,
        refresh_token: Option<&RefreshToken>,
    ) -> Result<(), TokenError> {
        let claims = match self.signer.verify(&access_token.0, TokenKind::Access) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!(error = %e, "logout: access token already unusable");
                None
            }
        };

        // Refresh first: if it fails the access token still works and logout can be retried.
        if let Some(refresh_token) = refresh_token {
            self.discard_refresh(claims.as_ref().map(|c| c.subject), refresh_token)
                .await?;
        }
        let Some(claims) = claims else {
            return Ok(());
        };
        self.revoke_access_jti(&claims.jti, claims.expires_at).await?;

        info!(user_id = %claims.subject, access_jti = %claims.jti, "revoked credentials");
        Ok(())
    }

    async fn verify_access(&self, access_token: &AccessToken) -> Result<UserId, TokenError> {
        let claims = self.signer.verify(&access_token.0, TokenKind::Access)?;
        if self.store.exists(&self.keys.revoked(&claims.jti)).await? {
            return Err(TokenError::Revoked);
        }
        Ok(claims.subject)
    }
}
