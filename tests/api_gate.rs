mod common;

use authgate::api;
use authgate::domain_model::*;
use common::*;
use serde_json::{Value, json};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::http::Response;

struct Session {
    user_id: i64,
    access_token: String,
    refresh_token: String,
}

fn body(response: &Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

fn set_cookie(response: &Response<Bytes>) -> String {
    response
        .headers()
        .get("set-cookie")
        .expect("set-cookie header")
        .to_str()
        .unwrap()
        .to_string()
}

fn refresh_cookie_value(response: &Response<Bytes>) -> String {
    let cookie = set_cookie(response);
    let pair = cookie.split(';').next().unwrap();
    pair.strip_prefix("refresh_token=").unwrap().to_string()
}

async fn register(app: &TestApp, email: &str) -> Session {
    let filter = api::app(app.server.clone(), Vec::new());
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/register")
        .json(&json!({"name": "Ada", "email": email, "password": "correct horse"}))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body(&response);
    assert!(json["data"].get("refresh_token").is_none());
    Session {
        user_id: json["data"]["user"]["id"].as_i64().unwrap(),
        access_token: json["data"]["access_token"].as_str().unwrap().to_string(),
        refresh_token: refresh_cookie_value(&response),
    }
}

#[tokio::test]
async fn protected_route_requires_a_bearer_token() {
    let app = test_app();
    let filter = api::app(app.server.clone(), Vec::new());

    let response = warp::test::request()
        .path("/api/v1/me")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body(&response);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "Unauthorized");

    let response = warp::test::request()
        .path("/api/v1/me")
        .header("authorization", "Bearer not-a-token")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_sets_refresh_cookie_and_me_lists_permissions() {
    let app = test_app();
    let session = register(&app, "ada@example.com").await;
    app.rbac.grant(RoleId(1), USERS_LIST);
    app.rbac.assign_role(UserId(session.user_id), RoleId(1));

    let filter = api::app(app.server.clone(), Vec::new());
    let response = warp::test::request()
        .path("/api/v1/me")
        .header("authorization", format!("Bearer {}", session.access_token))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body(&response);
    assert_eq!(json["data"]["user_id"], session.user_id);
    assert_eq!(json["data"]["permissions"], json!([USERS_LIST]));
}

#[tokio::test]
async fn permission_gate_denies_then_allows_after_role_assignment() {
    let app = test_app();
    let session = register(&app, "ada@example.com").await;
    let filter = api::app(app.server.clone(), Vec::new());
    let path = format!("/api/v1/users/{}/permissions", session.user_id);
    let bearer = format!("Bearer {}", session.access_token);

    let response = warp::test::request()
        .path(&path)
        .header("authorization", &bearer)
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body(&response)["error"]["code"], "Forbidden");

    app.rbac.grant(RoleId(3), ROLES_MANAGE);
    app.rbac.assign_role(UserId(session.user_id), RoleId(3));

    let response = warp::test::request()
        .path(&path)
        .header("authorization", &bearer)
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["data"]["permissions"], json!([ROLES_MANAGE]));
}

#[tokio::test]
async fn rbac_outage_is_reported_as_unavailable() {
    let app = test_app_with_rbac_down();
    let session = register(&app, "ada@example.com").await;
    let filter = api::app(app.server.clone(), Vec::new());

    let response = warp::test::request()
        .path(&format!("/api/v1/users/{}/permissions", session.user_id))
        .header("authorization", format!("Bearer {}", session.access_token))
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body(&response)["error"]["code"], "ServiceUnavailable");
}

#[tokio::test]
async fn refresh_rotates_cookie_and_rejects_replay() {
    let app = test_app();
    let session = register(&app, "ada@example.com").await;
    let filter = api::app(app.server.clone(), Vec::new());
    let cookie = format!("refresh_token={}", session.refresh_token);

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/refresh")
        .header("cookie", &cookie)
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = refresh_cookie_value(&response);
    assert_ne!(rotated, session.refresh_token);
    let new_access = body(&response)["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let replay = warp::test::request()
        .method("POST")
        .path("/api/v1/refresh")
        .header("cookie", &cookie)
        .reply(&filter)
        .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    let old_access = warp::test::request()
        .path("/api/v1/me")
        .header("authorization", format!("Bearer {}", session.access_token))
        .reply(&filter)
        .await;
    assert_eq!(old_access.status(), StatusCode::UNAUTHORIZED);

    let new_access = warp::test::request()
        .path("/api/v1/me")
        .header("authorization", format!("Bearer {new_access}"))
        .reply(&filter)
        .await;
    assert_eq!(new_access.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_without_cookie_is_unauthorized() {
    let app = test_app();
    let filter = api::app(app.server.clone(), Vec::new());

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/refresh")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_cookie_and_kills_both_tokens() {
    let app = test_app();
    let session = register(&app, "ada@example.com").await;
    let filter = api::app(app.server.clone(), Vec::new());
    let bearer = format!("Bearer {}", session.access_token);
    let cookie = format!("refresh_token={}", session.refresh_token);

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/logout")
        .header("authorization", &bearer)
        .header("cookie", &cookie)
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).contains("Max-Age=0"));

    let me = warp::test::request()
        .path("/api/v1/me")
        .header("authorization", &bearer)
        .reply(&filter)
        .await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

    let refresh = warp::test::request()
        .method("POST")
        .path("/api/v1/refresh")
        .header("cookie", &cookie)
        .reply(&filter)
        .await;
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_failures_and_duplicate_registration() {
    let app = test_app();
    register(&app, "ada@example.com").await;
    let filter = api::app(app.server.clone(), Vec::new());

    let wrong = warp::test::request()
        .method("POST")
        .path("/api/v1/login")
        .json(&json!({"email": "ada@example.com", "password": "wrong password"}))
        .reply(&filter)
        .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&wrong)["error"]["code"], "InvalidCredentials");

    let ok = warp::test::request()
        .method("POST")
        .path("/api/v1/login")
        .json(&json!({"email": "ada@example.com", "password": "correct horse"}))
        .reply(&filter)
        .await;
    assert_eq!(ok.status(), StatusCode::OK);
    assert!(set_cookie(&ok).starts_with("refresh_token="));

    let duplicate = warp::test::request()
        .method("POST")
        .path("/api/v1/register")
        .json(&json!({"name": "Ada", "email": "ADA@example.com", "password": "correct horse"}))
        .reply(&filter)
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_body_and_unknown_route() {
    let app = test_app();
    let filter = api::app(app.server.clone(), Vec::new());

    let bad = warp::test::request()
        .method("POST")
        .path("/api/v1/login")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&filter)
        .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let missing = warp::test::request()
        .path("/api/v1/nowhere")
        .reply(&filter)
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let health = warp::test::request()
        .path("/api/v1/health")
        .reply(&filter)
        .await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body(&health)["data"]["status"], "up");
}
