use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn admin_approves_pending_signup_and_user_can_login() {
    let ctx = test_support::setup_test_context().await;
    let admin =
        test_support::insert_user(ctx.state.db(), "boss@example.com", UserRole::Admin, "boss-pass")
            .await;
    let token = test_support::bearer_token(&admin, ctx.state.settings());
    let pending = test_support::insert_pending(
        ctx.state.db(),
        "newbie@example.com",
        UserRole::Teacher,
        "newbie-pass",
    )
    .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/pending-approvals",
            Some(&token),
            None,
        ))
        .await
        .expect("list pending");
    assert_eq!(response.status(), StatusCode::OK);
    let listed = test_support::read_json(response).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["email"], "newbie@example.com");
    assert!(listed[0].get("hashed_password").is_none());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/pending-approvals/{}/approve", pending.id),
            Some(&token),
            None,
        ))
        .await
        .expect("approve");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["user"]["id"], pending.id.as_str());
    assert_eq!(body["user"]["role"], "teacher");
    assert_eq!(body["user"]["is_active"], true);

    assert!(repositories::pending_approvals::find_by_email(ctx.state.db(), "newbie@example.com")
        .await
        .expect("pending lookup")
        .is_none());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "newbie@example.com", "password": "newbie-pass" })),
        ))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/pending-approvals/{}/approve", pending.id),
            Some(&token),
            None,
        ))
        .await
        .expect("approve again");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deny_removes_pending_signup() {
    let ctx = test_support::setup_test_context().await;
    let admin =
        test_support::insert_user(ctx.state.db(), "boss@example.com", UserRole::Admin, "boss-pass")
            .await;
    let token = test_support::bearer_token(&admin, ctx.state.settings());
    let pending = test_support::insert_pending(
        ctx.state.db(),
        "spam@example.com",
        UserRole::Student,
        "spam-pass",
    )
    .await;

    let uri = format!("/api/pending-approvals/{}/deny", pending.id);
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::DELETE, &uri, Some(&token), None))
        .await
        .expect("deny");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(test_support::read_json(response).await["success"], true);

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::DELETE, &uri, Some(&token), None))
        .await
        .expect("deny again");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_admins_cannot_manage_users() {
    let ctx = test_support::setup_test_context().await;
    let teacher =
        test_support::insert_user(ctx.state.db(), "t@example.com", UserRole::Teacher, "teach-pass")
            .await;
    let token = test_support::bearer_token(&teacher, ctx.state.settings());

    for (method, uri) in [
        (Method::GET, "/api/pending-approvals".to_string()),
        (Method::GET, "/api/users".to_string()),
        (Method::DELETE, format!("/api/users/{}", teacher.id)),
    ] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(method, &uri, Some(&token), None))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn admin_lists_updates_and_deletes_users() {
    let ctx = test_support::setup_test_context().await;
    let admin =
        test_support::insert_user(ctx.state.db(), "boss@example.com", UserRole::Admin, "boss-pass")
            .await;
    let token = test_support::bearer_token(&admin, ctx.state.settings());
    let student =
        test_support::insert_user(ctx.state.db(), "s@example.com", UserRole::Student, "stud-pass")
            .await;
    test_support::insert_user(ctx.state.db(), "t@example.com", UserRole::Teacher, "teach-pass")
        .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/users?role=student&limit=10",
            Some(&token),
            None,
        ))
        .await
        .expect("list users");
    assert_eq!(response.status(), StatusCode::OK);
    let listed = test_support::read_json(response).await;
    assert_eq!(listed["total_count"], 1);
    assert_eq!(listed["limit"], 10);
    assert_eq!(listed["items"][0]["email"], "s@example.com");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/users/{}", student.id),
            Some(&token),
            Some(json!({ "role": "teacher", "isActive": false })),
        ))
        .await
        .expect("update user");
    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["user"]["role"], "teacher");
    assert_eq!(updated["user"]["is_active"], false);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/users/{}", admin.id),
            Some(&token),
            None,
        ))
        .await
        .expect("delete self");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/users/{}", student.id),
            Some(&token),
            None,
        ))
        .await
        .expect("delete user");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/users/{}", student.id),
            Some(&token),
            Some(json!({ "is_active": true })),
        ))
        .await
        .expect("update missing user");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
