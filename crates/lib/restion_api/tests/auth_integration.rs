//! Integration tests — build the real router over the in-memory store and
//! drive the auth endpoints end to end.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use restion_api::config::ApiConfig;
use restion_api::{AppState, router};
use restion_core::auth::jwt::generate_token;
use restion_core::models::TokenKind;
use restion_core::store::MemoryStore;

const JWT_SECRET: &str = "integration-test-secret";

fn test_app() -> Router {
    let config = ApiConfig {
        jwt_secret: JWT_SECRET.into(),
    };
    router(AppState::new(Arc::new(MemoryStore::new()), config))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json_authed(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_me(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/api/auth/me");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

async fn register(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({"email": email, "password": password}),
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn register_returns_user_and_token_pair() {
    let app = test_app();

    let (status, body) = register(&app, "a@x.com", "pw123456").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["user"]["email"], "a@x.com");
    // Username derives from the email local part.
    assert_eq!(data["user"]["username"], "a");
    assert!(data["accessToken"].is_string());
    assert!(data["refreshToken"].is_string());
    assert!(
        data["user"].get("passwordHash").is_none() && data["user"].get("password_hash").is_none(),
        "password hash must never leave the API"
    );
}

#[tokio::test]
async fn duplicate_email_registration_conflicts() {
    let app = test_app();

    let (first, _) = register(&app, "a@x.com", "pw123456").await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, body) = register(&app, "a@x.com", "otherpassword").await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "EMAIL_ALREADY_REGISTERED");
}

#[tokio::test]
async fn email_lookup_is_case_sensitive() {
    let app = test_app();
    register(&app, "a@x.com", "pw123456").await;

    // Same address, different case: treated as a distinct account.
    let (status, _) = register(&app, "A@x.com", "pw123456").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn register_without_fields_is_a_schema_error() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", json!({"email": "a@x.com"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "MISSING_FIELDS");
}

#[tokio::test]
async fn login_distinguishes_nothing_between_bad_email_and_bad_password() {
    let app = test_app();
    register(&app, "a@x.com", "pw123456").await;

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "wrong"}),
        ))
        .await
        .unwrap();
    let unknown_email = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({"email": "b@x.com", "password": "pw123456"}),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let a = body_json(wrong_password).await;
    let b = body_json(unknown_email).await;
    assert_eq!(a["error"], b["error"]);
    assert_eq!(a["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn login_with_correct_password_issues_a_pair() {
    let app = test_app();
    register(&app, "a@x.com", "pw123456").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "pw123456"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["accessToken"].is_string());
    assert!(body["data"]["refreshToken"].is_string());
}

#[tokio::test]
async fn me_requires_a_token_and_echoes_the_caller() {
    let app = test_app();
    let (_, registered) = register(&app, "a@x.com", "pw123456").await;
    let access = registered["data"]["accessToken"].as_str().unwrap();

    let missing = app.clone().oneshot(get_me(None)).await.unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(missing).await["error"]["code"], "NO_TOKEN");

    let ok = app.clone().oneshot(get_me(Some(access))).await.unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let body = body_json(ok).await;
    assert_eq!(body["data"]["user"]["id"], registered["data"]["user"]["id"]);
}

#[tokio::test]
async fn expired_access_token_is_rejected_at_the_gate() {
    let app = test_app();
    let (_, registered) = register(&app, "a@x.com", "pw123456").await;
    let user_id = registered["data"]["user"]["id"].as_i64().unwrap();

    // Same signing secret, zero TTL: verifies structurally but is already dead.
    let expired =
        generate_token(user_id, TokenKind::Access, "jti-dead", 0, JWT_SECRET.as_bytes()).unwrap();

    let response = app
        .clone()
        .oneshot(get_me(Some(expired.as_str())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn valid_token_for_a_missing_user_is_rejected() {
    let app = test_app();

    // Properly signed and live, but the subject was never registered.
    let orphaned =
        generate_token(4242, TokenKind::Access, "jti-ghost", 60, JWT_SECRET.as_bytes()).unwrap();

    let response = app
        .clone()
        .oneshot(get_me(Some(orphaned.as_str())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn garbage_bearer_token_is_invalid() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(get_me(Some("not.a.jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn logout_revokes_the_access_token() {
    let app = test_app();
    let (_, registered) = register(&app, "a@x.com", "pw123456").await;
    let access = registered["data"]["accessToken"].as_str().unwrap();
    let refresh = registered["data"]["refreshToken"].as_str().unwrap();

    let logout = app
        .clone()
        .oneshot(post_json_authed(
            "/api/auth/logout",
            access,
            json!({"refreshToken": refresh}),
        ))
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);

    // The same access token is now denylisted.
    let me = app.clone().oneshot(get_me(Some(access))).await.unwrap();
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(me).await["error"]["code"], "TOKEN_REVOKED");

    // And the presented refresh token is dead too.
    let refresh_again = app
        .clone()
        .oneshot(post_json(
            "/api/auth/refresh",
            json!({"refreshToken": refresh}),
        ))
        .await
        .unwrap();
    assert_eq!(refresh_again.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_succeeds_even_with_an_invalid_refresh_token() {
    let app = test_app();
    let (_, registered) = register(&app, "a@x.com", "pw123456").await;
    let access = registered["data"]["accessToken"].as_str().unwrap();

    let logout = app
        .clone()
        .oneshot(post_json_authed(
            "/api/auth/logout",
            access,
            json!({"refreshToken": "never-issued"}),
        ))
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_rotates_and_rejects_replay() {
    let app = test_app();
    let (_, registered) = register(&app, "a@x.com", "pw123456").await;
    let original = registered["data"]["refreshToken"].as_str().unwrap();

    let first = app
        .clone()
        .oneshot(post_json(
            "/api/auth/refresh",
            json!({"refreshToken": original}),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let body = body_json(first).await;
    let rotated = body["data"]["refreshToken"].as_str().unwrap();
    assert_ne!(rotated, original);

    // Replaying the original secret fails: rotation is single-use.
    let replay = app
        .clone()
        .oneshot(post_json(
            "/api/auth/refresh",
            json!({"refreshToken": original}),
        ))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(replay).await["error"]["code"],
        "INVALID_REFRESH_TOKEN"
    );

    // The rotated secret still works.
    let next = app
        .clone()
        .oneshot(post_json(
            "/api/auth/refresh",
            json!({"refreshToken": rotated}),
        ))
        .await
        .unwrap();
    assert_eq!(next.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_accepts_the_cookie_when_the_body_is_empty() {
    let app = test_app();
    let (_, registered) = register(&app, "a@x.com", "pw123456").await;
    let refresh = registered["data"]["refreshToken"].as_str().unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, format!("refresh_token={refresh}"))
        .body(Body::from("{}"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_without_any_token_is_rejected() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/refresh", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "NO_TOKEN");
}

#[tokio::test]
async fn empty_refresh_cookie_counts_as_no_token() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, "refresh_token=")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "NO_TOKEN");
}

#[tokio::test]
async fn concurrent_refresh_with_the_same_secret_has_exactly_one_winner() {
    let app = test_app();
    let (_, registered) = register(&app, "a@x.com", "pw123456").await;
    let refresh = registered["data"]["refreshToken"].as_str().unwrap().to_string();

    let race = |app: Router, secret: String| async move {
        app.oneshot(post_json(
            "/api/auth/refresh",
            json!({"refreshToken": secret}),
        ))
        .await
        .unwrap()
        .status()
    };
    let (a, b) = tokio::join!(
        tokio::spawn(race(app.clone(), refresh.clone())),
        tokio::spawn(race(app.clone(), refresh.clone()))
    );
    let statuses = [a.unwrap(), b.unwrap()];

    let wins = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let losses = statuses
        .iter()
        .filter(|s| **s == StatusCode::UNAUTHORIZED)
        .count();
    assert_eq!((wins, losses), (1, 1), "statuses: {statuses:?}");
}

#[tokio::test]
async fn logout_all_kills_every_session() {
    let app = test_app();
    let (_, registered) = register(&app, "a@x.com", "pw123456").await;
    let first_refresh = registered["data"]["refreshToken"].as_str().unwrap();

    // Second session for the same account.
    let login = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "pw123456"}),
        ))
        .await
        .unwrap();
    let login_body = body_json(login).await;
    let second_access = login_body["data"]["accessToken"].as_str().unwrap();
    let second_refresh = login_body["data"]["refreshToken"].as_str().unwrap();

    let logout_all = app
        .clone()
        .oneshot(post_json_authed(
            "/api/auth/logout-all",
            second_access,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(logout_all.status(), StatusCode::OK);

    // Both refresh tokens are revoked.
    for secret in [first_refresh, second_refresh] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/auth/refresh",
                json!({"refreshToken": secret}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // The calling access token died with the rest.
    let me = app
        .clone()
        .oneshot(get_me(Some(second_access)))
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(me).await["error"]["code"], "TOKEN_REVOKED");
}

#[tokio::test]
async fn root_endpoint_greets() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Hello World!");
}
