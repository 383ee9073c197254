use super::cookie::{CookiePolicy, with_refresh_cookie};
use super::gate::{with_permission, with_verification};
use super::handler;
use crate::domain_model::ROLES_MANAGE;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handler::health);

    let register = warp::path("register")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and(with_cookie_policy(server.cookie_policy.clone()))
        .and_then(handler::register);

    let login = warp::path("login")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and(with_cookie_policy(server.cookie_policy.clone()))
        .and_then(handler::login);

    let refresh = warp::path("refresh")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_refresh_cookie())
        .and(with(server.token_service.clone()))
        .and(with_cookie_policy(server.cookie_policy.clone()))
        .and_then(handler::refresh);

    let logout = warp::path("logout")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_verification(server.token_service.clone()))
        .and(with_refresh_cookie())
        .and(with(server.token_service.clone()))
        .and(with_cookie_policy(server.cookie_policy.clone()))
        .and_then(handler::logout);

    let me = warp::path("me")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_verification(server.token_service.clone()))
        .and(with(server.permission_service.clone()))
        .and_then(handler::me);

    let user_permissions = warp::path!("users" / i64 / "permissions")
        .and(warp::get())
        .and(with_permission(
            server.token_service.clone(),
            server.permission_service.clone(),
            ROLES_MANAGE,
        ))
        .and(with(server.permission_service.clone()))
        .and_then(handler::user_permissions);

    health
        .or(register)
        .or(login)
        .or(refresh)
        .or(logout)
        .or(me)
        .or(user_permissions)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_cookie_policy(
    policy: CookiePolicy,
) -> impl Filter<Extract = (CookiePolicy,), Error = Infallible> + Clone {
    warp::any().map(move || policy.clone())
}
