//! Integration tests for share link issuance, resolution, and administration.

mod helpers;

use axum::http::StatusCode;
use axum::http::header::LOCATION;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_share_article_and_resolve() {
    let app = TestApp::new().await;
    let (article_id, _) = app.seed_article("Onboarding", 2).await;

    let created = app.share_article(&article_id, None).await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);

    let token = created.data_str("token");
    assert_eq!(token.len(), 43);
    assert_eq!(created.data_str("url"), format!("https://kb.test/s/{token}"));
    assert_eq!(created.body["data"]["target"]["scope"], "article");
    assert_eq!(created.body["data"]["view_count"], 0);

    let shared = app
        .request("GET", &format!("/s/{token}"), None, None)
        .await;
    assert_eq!(shared.status, StatusCode::OK, "{:?}", shared.body);
    assert_eq!(shared.body["data"]["article"]["title"], "Onboarding");
    assert_eq!(shared.body["data"]["paragraphs"].as_array().map(Vec::len), Some(2));
    assert!(shared.body["data"]["paragraph"].is_null());
    assert_eq!(shared.body["data"]["view_count"], 1);
}

#[tokio::test]
async fn test_share_paragraph_highlights_paragraph() {
    let app = TestApp::new().await;
    let (article_id, paragraphs) = app.seed_article("Release notes", 3).await;

    let created = app
        .request(
            "POST",
            &format!("/api/articles/{article_id}/paragraphs/{}/share", paragraphs[1]),
            Some(json!({ "expiry_hours": 2 })),
            Some(&app.reader_token),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    assert_eq!(created.body["data"]["target"]["scope"], "paragraph");

    let token = created.data_str("token");
    let shared = app
        .request("GET", &format!("/s/{token}"), None, None)
        .await;
    assert_eq!(shared.status, StatusCode::OK);
    assert_eq!(shared.body["data"]["paragraph"]["id"], paragraphs[1].as_str());
}

#[tokio::test]
async fn test_share_unknown_targets() {
    let app = TestApp::new().await;
    let (article_id, _) = app.seed_article("Real", 1).await;

    let missing_article = app
        .share_article("00000000-0000-0000-0000-000000000000", None)
        .await;
    assert_eq!(missing_article.status, StatusCode::NOT_FOUND);

    let missing_paragraph = app
        .request(
            "POST",
            &format!(
                "/api/articles/{article_id}/paragraphs/00000000-0000-0000-0000-000000000000/share"
            ),
            None,
            None,
        )
        .await;
    assert_eq!(missing_paragraph.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_token_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request("GET", "/s/definitely-not-a-real-token", None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "SHARE_NOT_FOUND");
}

#[tokio::test]
async fn test_cap_evicts_oldest_link() {
    let app = TestApp::new().await;
    let (article_id, _) = app.seed_article("Popular", 1).await;

    let settings = app
        .request(
            "PUT",
            "/api/admin/share-settings",
            Some(json!({ "max_shares_per_item": 2 })),
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(settings.status, StatusCode::OK, "{:?}", settings.body);

    let first = app.share_article(&article_id, None).await.data_str("token");
    app.share_article(&article_id, None).await;
    let third = app.share_article(&article_id, None).await;
    assert_eq!(third.body["data"]["evicted"], 1);

    let evicted = app
        .request("GET", &format!("/s/{first}"), None, None)
        .await;
    assert_eq!(evicted.status, StatusCode::FORBIDDEN);
    assert_eq!(evicted.error_code(), "SHARE_INACTIVE");

    let active = app
        .request(
            "GET",
            &format!("/api/admin/share-links?article_id={article_id}&active_only=true"),
            None,
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(active.status, StatusCode::OK);
    assert_eq!(active.body["data"]["total_items"], 2);
}

#[tokio::test]
async fn test_require_auth_redirects_anonymous_visitors() {
    let app = TestApp::new().await;
    let (article_id, _) = app.seed_article("Internal", 1).await;
    let token = app.share_article(&article_id, None).await.data_str("token");

    app.request(
        "PUT",
        "/api/admin/share-settings",
        Some(json!({ "require_auth": true })),
        Some(&app.admin_token),
    )
    .await;

    let anonymous = app
        .request("GET", &format!("/s/{token}"), None, None)
        .await;
    assert_eq!(anonymous.status, StatusCode::SEE_OTHER);
    assert_eq!(
        anonymous.headers.get(LOCATION).and_then(|v| v.to_str().ok()),
        Some(format!("/login?next=/s/{token}").as_str())
    );

    let signed_in = app
        .request("GET", &format!("/s/{token}"), None, Some(&app.reader_token))
        .await;
    assert_eq!(signed_in.status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_bearer_is_rejected_on_resolve() {
    let app = TestApp::new().await;
    let (article_id, _) = app.seed_article("Guarded", 1).await;
    let token = app.share_article(&article_id, None).await.data_str("token");

    let response = app
        .request("GET", &format!("/s/{token}"), None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deactivate_and_view_log() {
    let app = TestApp::new().await;
    let (article_id, _) = app.seed_article("Tracked", 1).await;
    let created = app.share_article(&article_id, None).await;
    let link_id = created.data_str("id");
    let token = created.data_str("token");

    app.request("GET", &format!("/s/{token}"), None, None).await;
    app.request("GET", &format!("/s/{token}"), None, None).await;

    let views = app
        .request(
            "GET",
            &format!("/api/admin/share-links/{link_id}/views"),
            None,
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(views.status, StatusCode::OK, "{:?}", views.body);
    assert_eq!(views.body["data"]["total_items"], 2);
    assert_eq!(views.body["data"]["items"][0]["user_agent"], "integration-test");

    let deactivated = app
        .request(
            "POST",
            "/api/admin/share-links/deactivate",
            Some(json!({ "ids": [link_id] })),
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(deactivated.status, StatusCode::OK);
    assert_eq!(deactivated.body["data"]["deactivated"], 1);

    let gone = app
        .request("GET", &format!("/s/{token}"), None, None)
        .await;
    assert_eq!(gone.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_endpoints_require_admin_role() {
    let app = TestApp::new().await;

    let anonymous = app
        .request("GET", "/api/admin/share-settings", None, None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let reader = app
        .request(
            "GET",
            "/api/admin/share-settings",
            None,
            Some(&app.reader_token),
        )
        .await;
    assert_eq!(reader.status, StatusCode::FORBIDDEN);

    let admin = app
        .request(
            "GET",
            "/api/admin/share-settings",
            None,
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(admin.status, StatusCode::OK);
    assert_eq!(admin.body["data"]["expiry_hours"], 24);
    assert_eq!(admin.body["data"]["max_shares_per_item"], 100);
}

#[tokio::test]
async fn test_settings_update_is_validated() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "PUT",
            "/api/admin/share-settings",
            Some(json!({ "expiry_hours": 9000 })),
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_cleanup_with_nothing_expired() {
    let app = TestApp::new().await;
    let (article_id, _) = app.seed_article("Fresh", 1).await;
    app.share_article(&article_id, None).await;

    let response = app
        .request(
            "POST",
            "/api/admin/share-links/cleanup",
            None,
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["removed"], 0);
}
