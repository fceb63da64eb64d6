//! Integration tests for ratings, comment moderation, and paragraph votes.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_rating_requires_sign_in_and_averages() {
    let app = TestApp::new().await;
    let (article_id, _) = app.seed_article("Rated", 0).await;
    let path = format!("/api/articles/{article_id}/rating");

    let anonymous = app
        .request("PUT", &path, Some(json!({ "rating": 4 })), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let out_of_range = app
        .request("PUT", &path, Some(json!({ "rating": 6 })), Some(&app.reader_token))
        .await;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);

    for (rating, token) in [(2, &app.reader_token), (4, &app.admin_token)] {
        let rated = app
            .request("PUT", &path, Some(json!({ "rating": rating })), Some(token))
            .await;
        assert_eq!(rated.status, StatusCode::OK, "{:?}", rated.body);
    }

    let summary = app.request("GET", &path, None, Some(&app.reader_token)).await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.body["data"]["count"], 2);
    assert_eq!(summary.body["data"]["average"], 3.0);
    assert_eq!(summary.body["data"]["own_rating"], 2);
}

#[tokio::test]
async fn test_comment_visible_after_approval() {
    let app = TestApp::new().await;
    let (article_id, _) = app.seed_article("Discussed", 0).await;
    let path = format!("/api/articles/{article_id}/comments");

    let submitted = app
        .request(
            "POST",
            &path,
            Some(json!({ "content": "Step 3 needs sudo." })),
            Some(&app.reader_token),
        )
        .await;
    assert_eq!(submitted.status, StatusCode::ACCEPTED, "{:?}", submitted.body);
    assert_eq!(submitted.body["data"]["is_approved"], false);
    let comment_id = submitted.data_str("id");

    let public = app.request("GET", &path, None, None).await;
    assert_eq!(public.body["data"]["total_items"], 0);

    let queue = app
        .request(
            "GET",
            "/api/admin/comments?approved=false",
            None,
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(queue.status, StatusCode::OK);
    assert_eq!(queue.body["data"]["items"][0]["id"], comment_id.as_str());

    let forbidden = app
        .request(
            "POST",
            "/api/admin/comments/approve",
            Some(json!({ "ids": [comment_id] })),
            Some(&app.reader_token),
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let approved = app
        .request(
            "POST",
            "/api/admin/comments/approve",
            Some(json!({ "ids": [comment_id] })),
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.body["data"]["changed"], 1);

    let public = app.request("GET", &path, None, None).await;
    assert_eq!(public.body["data"]["total_items"], 1);
    assert_eq!(public.body["data"]["items"][0]["content"], "Step 3 needs sudo.");

    let withdrawn = app
        .request(
            "POST",
            "/api/admin/comments/unapprove",
            Some(json!({ "ids": [comment_id] })),
            Some(&app.admin_token),
        )
        .await;
    assert_eq!(withdrawn.body["data"]["changed"], 1);
    let public = app.request("GET", &path, None, None).await;
    assert_eq!(public.body["data"]["total_items"], 0);
}

#[tokio::test]
async fn test_paragraph_votes() {
    let app = TestApp::new().await;
    let (article_id, paragraphs) = app.seed_article("Voted", 2).await;
    let path = format!("/api/articles/{article_id}/paragraphs/{}/like", paragraphs[0]);

    let anonymous = app
        .request("PUT", &path, Some(json!({ "is_like": true })), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let liked = app
        .request("PUT", &path, Some(json!({ "is_like": true })), Some(&app.reader_token))
        .await;
    assert_eq!(liked.status, StatusCode::OK, "{:?}", liked.body);
    assert_eq!(liked.body["data"]["likes"], 1);
    assert_eq!(liked.body["data"]["own_vote"], true);

    let switched = app
        .request("PUT", &path, Some(json!({ "is_like": false })), Some(&app.reader_token))
        .await;
    assert_eq!(switched.body["data"]["likes"], 0);
    assert_eq!(switched.body["data"]["dislikes"], 1);

    let cleared = app.request("DELETE", &path, None, Some(&app.reader_token)).await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.body["data"]["dislikes"], 0);

    let (other_article, _) = app.seed_article("Elsewhere", 0).await;
    let mismatched = app
        .request(
            "GET",
            &format!("/api/articles/{other_article}/paragraphs/{}/like", paragraphs[0]),
            None,
            None,
        )
        .await;
    assert_eq!(mismatched.status, StatusCode::NOT_FOUND);
}
