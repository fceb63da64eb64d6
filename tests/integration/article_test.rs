//! Integration tests for browsing, search, and health.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_home_lists_categories_and_latest() {
    let app = TestApp::new().await;
    app.seed_article("Getting started", 1).await;
    app.seed_article("Troubleshooting", 1).await;

    let home = app.request("GET", "/api/home", None, None).await;
    assert_eq!(home.status, StatusCode::OK);
    assert_eq!(home.body["data"]["categories"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        home.body["data"]["latest_articles"].as_array().map(Vec::len),
        Some(2)
    );
}

#[tokio::test]
async fn test_article_detail_has_ordered_paragraphs() {
    let app = TestApp::new().await;
    let (article_id, paragraphs) = app.seed_article("Deep dive", 3).await;

    let detail = app
        .request("GET", &format!("/api/articles/{article_id}"), None, None)
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["data"]["article"]["title"], "Deep dive");
    let ids: Vec<&str> = detail.body["data"]["paragraphs"]
        .as_array()
        .expect("paragraphs")
        .iter()
        .filter_map(|p| p["id"].as_str())
        .collect();
    assert_eq!(ids, paragraphs.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_missing_article_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "GET",
            "/api/articles/00000000-0000-0000-0000-000000000000",
            None,
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_search_matches_titles() {
    let app = TestApp::new().await;
    app.seed_article("Password reset", 1).await;
    app.seed_article("Billing", 1).await;

    let hits = app
        .request("GET", "/api/search?q=password", None, None)
        .await;
    assert_eq!(hits.status, StatusCode::OK);
    assert_eq!(hits.body["data"]["total_items"], 1);
    assert_eq!(hits.body["data"]["items"][0]["title"], "Password reset");

    let blank = app.request("GET", "/api/search?q=", None, None).await;
    assert_eq!(blank.status, StatusCode::OK);
    assert_eq!(blank.body["data"]["total_items"], 0);
}

#[tokio::test]
async fn test_content_seeding_requires_admin() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/admin/categories",
            Some(json!({ "name": "Sneaky" })),
            Some(&app.reader_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new().await;

    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["data"]["status"], "ok");

    let detailed = app
        .request("GET", "/api/health/detailed", None, None)
        .await;
    assert_eq!(detailed.status, StatusCode::OK);
    assert_eq!(detailed.body["data"]["backend"], "memory");
}
