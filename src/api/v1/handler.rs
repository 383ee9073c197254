use super::cookie::CookiePolicy;
use super::error::*;
use super::gate::AuthContext;
use crate::application_port::*;
use crate::domain_model::{AccessToken, PermissionSet, RefreshToken, TokenPair, UserId, UserProfile};
use crate::logger::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::http::header::SET_COOKIE;
use warp::{Reply, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    time: DateTime<Utc>,
}

pub async fn health() -> Result<impl Reply, warp::Rejection> {
    Ok(warp::reply::json(&ApiResponse::ok(HealthResponse {
        status: "up",
        time: Utc::now(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    user: UserProfile,
    access_token: AccessToken,
    access_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct RefreshResponse {
    access_token: AccessToken,
    access_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct LogoutResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct PermissionsResponse {
    user_id: UserId,
    permissions: PermissionSet,
}

// Body carries the access token; the refresh token only travels in the cookie.
fn session_reply(
    user: UserProfile,
    tokens: TokenPair,
    status: StatusCode,
    cookie_policy: CookiePolicy,
) -> impl Reply {
    let cookie = cookie_policy.set_refresh(&tokens.refresh_token, tokens.refresh_token_expires_at);
    let body = SessionResponse {
        user,
        access_token: tokens.access_token,
        access_token_expires_at: tokens.access_token_expires_at,
    };
    let json = warp::reply::json(&ApiResponse::ok(body));
    warp::reply::with_header(warp::reply::with_status(json, status), SET_COOKIE, cookie)
}

pub async fn register(
    request: RegisterRequest,
    auth_service: Arc<dyn AuthService>,
    cookie_policy: CookiePolicy,
) -> Result<impl Reply, warp::Rejection> {
    let outcome = auth_service
        .register(RegisterInput {
            name: request.name,
            email: request.email,
            password: request.password,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!(user_id = %outcome.user.id, "account registered");
    Ok(session_reply(
        outcome.user,
        outcome.tokens,
        StatusCode::CREATED,
        cookie_policy,
    ))
}

pub async fn login(
    request: LoginRequest,
    auth_service: Arc<dyn AuthService>,
    cookie_policy: CookiePolicy,
) -> Result<impl Reply, warp::Rejection> {
    let outcome = auth_service
        .login(LoginInput {
            email: request.email,
            password: request.password,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!(user_id = %outcome.user.id, "login");
    Ok(session_reply(
        outcome.user,
        outcome.tokens,
        StatusCode::OK,
        cookie_policy,
    ))
}

pub async fn refresh(
    refresh_token: Option<RefreshToken>,
    token_service: Arc<dyn TokenService>,
    cookie_policy: CookiePolicy,
) -> Result<impl Reply, warp::Rejection> {
    let refresh_token =
        refresh_token.ok_or_else(|| reject::custom(ApiErrorCode::Unauthorized))?;
    let tokens = token_service
        .rotate_pair(&refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let cookie = cookie_policy.set_refresh(&tokens.refresh_token, tokens.refresh_token_expires_at);
    let json = warp::reply::json(&ApiResponse::ok(RefreshResponse {
        access_token: tokens.access_token,
        access_token_expires_at: tokens.access_token_expires_at,
    }));
    Ok(warp::reply::with_header(json, SET_COOKIE, cookie))
}

pub async fn logout(
    ctx: AuthContext,
    refresh_token: Option<RefreshToken>,
    token_service: Arc<dyn TokenService>,
    cookie_policy: CookiePolicy,
) -> Result<impl Reply, warp::Rejection> {
    token_service
        .revoke(&ctx.access_token, refresh_token.as_ref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!(user_id = %ctx.user_id, "logout");
    let json = warp::reply::json(&ApiResponse::ok(LogoutResponse {
        message: "Logout successful",
    }));
    Ok(warp::reply::with_header(
        json,
        SET_COOKIE,
        cookie_policy.clear_refresh(),
    ))
}

pub async fn me(
    ctx: AuthContext,
    permission_service: Arc<dyn PermissionService>,
) -> Result<impl Reply, warp::Rejection> {
    permissions_of(ctx.user_id, permission_service).await
}

pub async fn user_permissions(
    user_id: i64,
    _ctx: AuthContext,
    permission_service: Arc<dyn PermissionService>,
) -> Result<impl Reply, warp::Rejection> {
    permissions_of(UserId(user_id), permission_service).await
}

async fn permissions_of(
    user_id: UserId,
    permission_service: Arc<dyn PermissionService>,
) -> Result<warp::reply::Json, warp::Rejection> {
    let permissions = permission_service
        .resolve(user_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(PermissionsResponse {
        user_id,
        permissions,
    })))
}
