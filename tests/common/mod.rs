#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use chirpy::{ServerConfig, create_app, db::Database};
use serde_json::Value;
use tower::ServiceExt;

pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const JWT_SECRET: &[u8] = b"integration-test-secret-at-least-32-bytes";

pub struct TestApp {
    pub app: Router,
    pub db: Database,
}

pub async fn create_test_app() -> TestApp {
    create_test_app_on("dev").await
}

pub async fn create_test_app_on(platform: &str) -> TestApp {
    create_test_app_with(platform, "public").await
}

pub async fn create_test_app_with(platform: &str, static_dir: &str) -> TestApp {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: JWT_SECRET.to_vec(),
        polka_key: POLKA_KEY.to_string(),
        platform: platform.to_string(),
        static_dir: static_dir.to_string(),
    };
    TestApp {
        app: create_app(&config),
        db,
    }
}

impl TestApp {
    /// Send a request with an optional JSON body and Authorization header.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn register(&self, email: &str, password: &str) -> Value {
        let response = self
            .send(
                "POST",
                "/api/users",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Value {
        let response = self
            .send(
                "POST",
                "/api/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await
    }
}

pub fn bearer(token: &Value) -> String {
    format!("Bearer {}", token.as_str().unwrap())
}

pub async fn json_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
