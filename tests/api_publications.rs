//! HTTP integration tests for accounts, publications, comments and
//! notifications.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;
use guildhall::domain::foundation::Role;

fn article() -> serde_json::Value {
    json!({
        "title": "Annual general meeting recap",
        "content": "Minutes and resolutions from this year's meeting.",
        "category": "governance"
    })
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn register_then_login_returns_usable_token() {
    let app = TestApp::new();
    app.register("Ngozi Adeyemi", "Ngozi@Example.org").await;

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ngozi@example.org", "password": "correct horse battery" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user"].get("password_hash").is_none());
    let token = body["token"].as_str().unwrap();

    let (status, me) = app.get("/api/users/me", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ngozi@example.org");
    assert_eq!(me["role"], "member");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::new();
    app.register("Ngozi Adeyemi", "ngozi@example.org").await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({
                "name": "Someone Else",
                "email": "NGOZI@example.org",
                "password": "another password"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.register("Ngozi Adeyemi", "ngozi@example.org").await;

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ngozi@example.org", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/users/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = app.get("/api/users/me", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_cannot_change_own_role() {
    let app = TestApp::new();
    let admin = app.staff("Tunde Bakare", "tunde@example.org", Role::Admin).await;

    let (status, body) = app
        .put(
            &format!("/api/users/{}/role", admin.id),
            Some(&admin.token),
            json!({ "role": "member" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn admin_promotes_member_to_editor() {
    let app = TestApp::new();
    let admin = app.staff("Tunde Bakare", "tunde@example.org", Role::Admin).await;
    let member = app.register("Ngozi Adeyemi", "ngozi@example.org").await;

    let (status, body) = app
        .put(
            &format!("/api/users/{}/role", member.id),
            Some(&admin.token),
            json!({ "role": "editor" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "editor");

    let (status, _) = app
        .put(
            &format!("/api/users/{}/role", admin.id),
            Some(&member.token),
            json!({ "role": "member" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Publications
// =============================================================================

#[tokio::test]
async fn publication_moderation_flow() {
    let app = TestApp::new();
    let editor = app.staff("Efe Okoro", "efe@example.org", Role::Editor).await;
    let author = app.register("Ngozi Adeyemi", "ngozi@example.org").await;

    let (status, created) = app.post("/api/publications", Some(&author.token), article()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    let id = created["id"].as_str().unwrap().to_string();

    // pending work is hidden from the public listing and from guests
    let (_, listing) = app.get("/api/publications", None).await;
    assert_eq!(listing["total"], 0);
    let (status, _) = app.get(&format!("/api/publications/{id}"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // moderators were told about the submission
    let (_, inbox) = app.get("/api/notifications", Some(&editor.token)).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);

    let (_, pending) = app.get("/api/publications/pending", Some(&editor.token)).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (status, approved) = app
        .send(
            Method::PUT,
            &format!("/api/publications/{id}/approve"),
            Some(&editor.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (status, public) = app.get(&format!("/api/publications/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public["author"]["name"], "Ngozi Adeyemi");

    let (_, inbox) = app
        .get("/api/notifications?unread=true", Some(&author.token))
        .await;
    let inbox = inbox.as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["read"], false);

    // approved work is frozen for the author
    let (status, _) = app
        .put(&format!("/api/publications/{id}"), Some(&author.token), article())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn members_cannot_moderate() {
    let app = TestApp::new();
    let author = app.register("Ngozi Adeyemi", "ngozi@example.org").await;
    let (_, created) = app.post("/api/publications", Some(&author.token), article()).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/publications/{id}/approve"),
            Some(&author.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = app.get("/api/publications/pending", Some(&author.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rejected_publication_keeps_reason_and_is_editable() {
    let app = TestApp::new();
    let editor = app.staff("Efe Okoro", "efe@example.org", Role::Editor).await;
    let author = app.register("Ngozi Adeyemi", "ngozi@example.org").await;
    let (_, created) = app.post("/api/publications", Some(&author.token), article()).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, rejected) = app
        .put(
            &format!("/api/publications/{id}/reject"),
            Some(&editor.token),
            json!({ "reason": "Needs sources" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["rejection_reason"], "Needs sources");

    let (_, mine) = app
        .get("/api/publications/mine?status=rejected", Some(&author.token))
        .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (status, revised) = app
        .put(&format!("/api/publications/{id}"), Some(&author.token), article())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revised["status"], "pending");
}

#[tokio::test]
async fn invalid_publication_payloads_are_rejected() {
    let app = TestApp::new();
    let author = app.register("Ngozi Adeyemi", "ngozi@example.org").await;

    let (status, body) = app
        .post(
            "/api/publications",
            Some(&author.token),
            json!({ "title": "", "content": "x", "category": "news" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");

    let (status, _) = app
        .post("/api/publications", Some(&author.token), json!({ "title": 3 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/publications/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (status, _) = app
        .get("/api/publications/3f2a1c9e-8d7b-4c6a-9e5f-1a2b3c4d5e6f", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Comments and notifications
// =============================================================================

#[tokio::test]
async fn comments_on_approved_publication_notify_author() {
    let app = TestApp::new();
    let editor = app.staff("Efe Okoro", "efe@example.org", Role::Editor).await;
    let author = app.register("Ngozi Adeyemi", "ngozi@example.org").await;
    let reader = app.register("Kemi Lawal", "kemi@example.org").await;

    let (_, created) = app.post("/api/publications", Some(&author.token), article()).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            &format!("/api/publications/{id}/comments"),
            Some(&reader.token),
            json!({ "content": "Too early" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.send(
        Method::PUT,
        &format!("/api/publications/{id}/approve"),
        Some(&editor.token),
        None,
    )
    .await;
    app.send(Method::PUT, "/api/notifications/read-all", Some(&author.token), None)
        .await;

    let (status, comment) = app
        .post(
            &format!("/api/publications/{id}/comments"),
            Some(&reader.token),
            json!({ "content": "Thanks for the summary" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = comment["id"].as_str().unwrap().to_string();

    let (_, comments) = app
        .get(&format!("/api/publications/{id}/comments"), None)
        .await;
    assert_eq!(comments.as_array().unwrap().len(), 1);

    let (_, unread) = app
        .get("/api/notifications?unread=true", Some(&author.token))
        .await;
    assert_eq!(unread.as_array().unwrap().len(), 1);

    // only the commenter or staff may delete
    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/comments/{comment_id}"),
            Some(&author.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/comments/{comment_id}"),
            Some(&reader.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn notifications_are_private_to_their_owner() {
    let app = TestApp::new();
    let editor = app.staff("Efe Okoro", "efe@example.org", Role::Editor).await;
    let author = app.register("Ngozi Adeyemi", "ngozi@example.org").await;
    app.post("/api/publications", Some(&author.token), article()).await;

    let (_, inbox) = app.get("/api/notifications", Some(&editor.token)).await;
    let notification_id = inbox[0]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/notifications/{notification_id}/read"),
            Some(&author.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, read) = app
        .send(
            Method::PUT,
            &format!("/api/notifications/{notification_id}/read"),
            Some(&editor.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["read"], true);
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
