use super::error::ApiErrorCode;
use crate::application_port::{PermissionService, TokenService};
use crate::domain_model::{AccessToken, PermissionCode, UserId};
use crate::logger::*;
use std::sync::Arc;
use warp::{Filter, Rejection, reject};

/// Caller identity established by a verified access token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    pub access_token: AccessToken,
}

fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject with 401 unless the request carries a live access token.
pub fn with_verification(
    token_service: Arc<dyn TokenService>,
) -> impl Filter<Extract = (AuthContext,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let token_service = token_service.clone();
        async move {
            let token = header
                .as_deref()
                .and_then(bearer_token)
                .ok_or_else(|| reject::custom(ApiErrorCode::Unauthorized))?;
            let access_token = AccessToken(token.to_string());
            let user_id = token_service
                .verify_access(&access_token)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)?;
            Ok::<_, Rejection>(AuthContext {
                user_id,
                access_token,
            })
        }
    })
}

/// `with_verification`, then 403 unless the caller holds `code`.
/// An unreachable RBAC store is a 503, never a silent allow.
pub fn with_permission(
    token_service: Arc<dyn TokenService>,
    permission_service: Arc<dyn PermissionService>,
    code: &'static str,
) -> impl Filter<Extract = (AuthContext,), Error = Rejection> + Clone {
    let code = PermissionCode::from(code);
    with_verification(token_service).and_then(move |ctx: AuthContext| {
        let permission_service = permission_service.clone();
        let code = code.clone();
        async move {
            let granted = permission_service
                .has_permission(ctx.user_id, &code)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)?;
            if !granted {
                debug!(user_id = %ctx.user_id, permission = %code, "permission denied");
                return Err(reject::custom(ApiErrorCode::Forbidden));
            }
            Ok(ctx)
        }
    })
}
