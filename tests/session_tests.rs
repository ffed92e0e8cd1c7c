mod common;

use axum::http::StatusCode;
use common::{bearer, create_test_app, json_body};
use serde_json::json;

#[tokio::test]
async fn test_login_returns_user_and_tokens() {
    let app = create_test_app().await;
    let user = app.register("saul@bettercall.com", "123456").await;

    let login = app.login("saul@bettercall.com", "123456").await;

    assert_eq!(login["id"], user["id"]);
    assert_eq!(login["email"], "saul@bettercall.com");
    assert_eq!(login["is_chirpy_red"], false);
    assert_eq!(login["token"].as_str().unwrap().split('.').count(), 3);
    assert_eq!(login["refresh_token"].as_str().unwrap().len(), 43);
    assert!(login.get("hashed_password").is_none());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_are_identical() {
    let app = create_test_app().await;
    app.register("saul@bettercall.com", "123456").await;

    let wrong = app
        .send(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "saul@bettercall.com", "password": "654321" })),
        )
        .await;
    let unknown = app
        .send(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "kim@bettercall.com", "password": "123456" })),
        )
        .await;

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(wrong).await, json_body(unknown).await);
}

#[tokio::test]
async fn test_refresh_issues_working_access_token() {
    let app = create_test_app().await;
    app.register("walt@breakingbad.com", "123456").await;
    let login = app.login("walt@breakingbad.com", "123456").await;

    let response = app
        .send("POST", "/api/refresh", Some(&bearer(&login["refresh_token"])), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = json_body(response).await;

    let response = app
        .send(
            "POST",
            "/api/chirps",
            Some(&bearer(&refreshed["token"])),
            Some(json!({ "body": "Still cooking" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_revoke_then_refresh_is_denied() {
    let app = create_test_app().await;
    app.register("walt@breakingbad.com", "123456").await;
    let login = app.login("walt@breakingbad.com", "123456").await;
    let refresh = bearer(&login["refresh_token"]);

    let response = app.send("POST", "/api/revoke", Some(&refresh), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send("POST", "/api/refresh", Some(&refresh), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // revoking again is not an error
    let response = app.send("POST", "/api/revoke", Some(&refresh), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_revoke_leaves_other_sessions_alone() {
    let app = create_test_app().await;
    app.register("walt@breakingbad.com", "123456").await;
    let first = app.login("walt@breakingbad.com", "123456").await;
    let second = app.login("walt@breakingbad.com", "123456").await;

    app.send("POST", "/api/revoke", Some(&bearer(&first["refresh_token"])), None)
        .await;

    let response = app
        .send("POST", "/api/refresh", Some(&bearer(&second["refresh_token"])), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_refresh_token_is_denied() {
    let app = create_test_app().await;

    let response = app
        .send("POST", "/api/refresh", Some("Bearer not-a-real-token"), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send("POST", "/api/revoke", Some("Bearer not-a-real-token"), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let app = create_test_app().await;
    app.register("walt@breakingbad.com", "123456").await;
    let login = app.login("walt@breakingbad.com", "123456").await;

    let response = app
        .send("POST", "/api/refresh", Some(&bearer(&login["token"])), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = create_test_app().await;
    app.register("walt@breakingbad.com", "123456").await;
    let login = app.login("walt@breakingbad.com", "123456").await;

    let response = app
        .send(
            "POST",
            "/api/chirps",
            Some(&bearer(&login["refresh_token"])),
            Some(json!({ "body": "hello" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_or_malformed_authorization() {
    let app = create_test_app().await;

    for header in [None, Some("Basic abc"), Some("Bearer"), Some("Bearer a b")] {
        let response = app.send("POST", "/api/refresh", header, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{:?}", header);
    }
}

#[tokio::test]
async fn test_scheme_is_case_insensitive() {
    let app = create_test_app().await;
    app.register("walt@breakingbad.com", "123456").await;
    let login = app.login("walt@breakingbad.com", "123456").await;
    let header = format!("bearer {}", login["refresh_token"].as_str().unwrap());

    let response = app.send("POST", "/api/refresh", Some(&header), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
