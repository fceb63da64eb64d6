//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use kb_api::{AppState, build_router};
use kb_auth::JwtEncoder;
use kb_core::config::{AppConfig, DatabaseBackend};
use kb_core::types::UserId;
use kb_database::Stores;
use kb_entity::user::{AuthenticatedUser, UserRole};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    /// Bearer token carrying the admin role
    pub admin_token: String,
    /// Bearer token carrying the reader role
    pub reader_token: String,
}

impl TestApp {
    /// Create a new test application over fresh in-memory stores
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.backend = DatabaseBackend::Memory;
        config.worker.enabled = false;
        config.share.public_base_url = "https://kb.test".to_string();
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let state =
            AppState::build(config.clone(), Stores::memory()).expect("Failed to build app state");

        let admin_token = Self::issue_token(&config, "admin", UserRole::Admin);
        let reader_token = Self::issue_token(&config, "reader", UserRole::Reader);

        Self {
            router: build_router(state),
            config,
            admin_token,
            reader_token,
        }
    }

    fn issue_token(config: &AppConfig, username: &str, role: UserRole) -> String {
        let user = AuthenticatedUser {
            user_id: UserId::new(),
            username: username.to_string(),
            role,
        };
        JwtEncoder::new(&config.auth)
            .issue(&user)
            .expect("Failed to issue token")
            .token
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("User-Agent", "integration-test");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Seed a category, an article, and `paragraphs` paragraphs through the
    /// admin API. Returns the article ID and paragraph IDs.
    pub async fn seed_article(&self, title: &str, paragraphs: usize) -> (String, Vec<String>) {
        let category = self
            .request(
                "POST",
                "/api/admin/categories",
                Some(json!({ "name": format!("{title} category") })),
                Some(&self.admin_token),
            )
            .await;
        assert_eq!(category.status, StatusCode::CREATED, "{:?}", category.body);
        let category_id = category.data_str("id");

        let article = self
            .request(
                "POST",
                "/api/admin/articles",
                Some(json!({
                    "category_id": category_id,
                    "title": title,
                    "summary": format!("About {title}"),
                    "tags": ["guide"],
                })),
                Some(&self.admin_token),
            )
            .await;
        assert_eq!(article.status, StatusCode::CREATED, "{:?}", article.body);
        let article_id = article.data_str("id");

        let mut paragraph_ids = Vec::with_capacity(paragraphs);
        for n in 0..paragraphs {
            let paragraph = self
                .request(
                    "POST",
                    &format!("/api/admin/articles/{article_id}/paragraphs"),
                    Some(json!({ "content": format!("Paragraph {n} of {title}") })),
                    Some(&self.admin_token),
                )
                .await;
            assert_eq!(paragraph.status, StatusCode::CREATED, "{:?}", paragraph.body);
            paragraph_ids.push(paragraph.data_str("id"));
        }

        (article_id, paragraph_ids)
    }

    /// Share an article anonymously and return the response
    pub async fn share_article(&self, article_id: &str, body: Option<Value>) -> TestResponse {
        self.request(
            "POST",
            &format!("/api/articles/{article_id}/share"),
            body,
            None,
        )
        .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// String field of the `data` envelope
    pub fn data_str(&self, field: &str) -> String {
        self.body["data"][field]
            .as_str()
            .unwrap_or_else(|| panic!("No data.{field} in {:?}", self.body))
            .to_string()
    }

    /// Error code of an error body
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
