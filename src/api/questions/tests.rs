use axum::http::{header, Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

async fn teacher_token(ctx: &test_support::TestContext) -> (String, String) {
    let teacher =
        test_support::insert_user(ctx.state.db(), "teach@example.com", UserRole::Teacher, "pass-123")
            .await;
    (test_support::bearer_token(&teacher, ctx.state.settings()), teacher.id)
}

#[tokio::test]
async fn teacher_adds_questions_and_searches_bank() {
    let ctx = test_support::setup_test_context().await;
    let (token, teacher_id) = teacher_token(&ctx).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/questions/subjective",
            Some(&token),
            Some(json!({
                "subject": "Physics",
                "year": 2023,
                "questionType": "long",
                "question_text": "Derive the lens equation."
            })),
        ))
        .await
        .expect("create subjective");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["question_type"], "long");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/questions/mcq",
            Some(&token),
            Some(json!({
                "subject": "Physics",
                "year": 2022,
                "question_text": "Unit of force?",
                "option_a": "Newton",
                "option_b": "Joule",
                "option_c": "Watt",
                "option_d": "Pascal",
                "correct_answer": " a "
            })),
        ))
        .await
        .expect("create mcq");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["correct_answer"], "A");
    assert_eq!(body["options"][1], json!({ "option": "B", "text": "Joule" }));

    test_support::insert_subjective(
        ctx.state.db(),
        "physics",
        2021,
        "short",
        "Define inertia.",
        &teacher_id,
    )
    .await;
    test_support::insert_subjective(ctx.state.db(), "Chemistry", 2021, "short", "Define pH.", &teacher_id)
        .await;
    test_support::insert_diagram(&ctx.state, "Physics", "Label the circuit.", &teacher_id).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/questions/PHYSICS?per_page=1",
            Some(&token),
            None,
        ))
        .await
        .expect("search");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["total_questions"], 4);
    assert_eq!(body["subjective"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["pagination"]["subjective"], json!({ "page": 1, "per_page": 1, "total": 2, "pages": 2 }));
    assert_eq!(body["mcqs"][0]["question_text"], "Unit of force?");
    let image_url = body["diagrams"][0]["image_url"].as_str().expect("image url");
    assert!(image_url.starts_with("/api/diagrams/"));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/questions/Physics?type=short&search=INERTIA",
            Some(&token),
            None,
        ))
        .await
        .expect("filtered search");
    let body = test_support::read_json(response).await;
    assert_eq!(body["pagination"]["subjective"]["total"], 1);
    assert_eq!(body["subjective"][0]["question_text"], "Define inertia.");
    assert_eq!(body["pagination"]["mcqs"]["total"], 0);

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/mcqs/physics", Some(&token), None))
        .await
        .expect("mcq list");
    let body = test_support::read_json(response).await;
    assert_eq!(body["mcqs"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn mcq_with_bad_answer_letter_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let (token, _) = teacher_token(&ctx).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/questions/mcq",
            Some(&token),
            Some(json!({
                "subject": "Physics",
                "year": 2022,
                "question_text": "Pick one",
                "option_a": "1",
                "option_b": "2",
                "option_c": "3",
                "option_d": "4",
                "correct_answer": "E"
            })),
        ))
        .await
        .expect("create mcq");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert_eq!(body["detail"], "Correct answer must be one of A, B, C or D");
}

#[tokio::test]
async fn students_cannot_use_question_bank() {
    let ctx = test_support::setup_test_context().await;
    let student =
        test_support::insert_user(ctx.state.db(), "kid@example.com", UserRole::Student, "pass-123")
            .await;
    let token = test_support::bearer_token(&student, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/questions/Physics",
            Some(&token),
            None,
        ))
        .await
        .expect("search");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn diagram_upload_is_stored_and_served() {
    let ctx = test_support::setup_test_context().await;
    let (token, _) = teacher_token(&ctx).await;

    let request = test_support::multipart_request(
        "/api/questions/diagrams",
        &token,
        &[
            ("subject", None, None, &b"Biology"[..]),
            ("year", None, None, &b"2024"[..]),
            ("question_text", None, None, &b"Label the cell."[..]),
            ("file", Some("cell.png"), Some("image/png"), test_support::PNG_PIXEL),
        ],
    );
    let response = ctx.app.clone().oneshot(request).await.expect("upload");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["mime_type"], "image/png");
    let image_url = body["image_url"].as_str().expect("image url").to_string();

    let student =
        test_support::insert_user(ctx.state.db(), "kid@example.com", UserRole::Student, "pass-123")
            .await;
    let student_token = test_support::bearer_token(&student, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &image_url, Some(&student_token), None))
        .await
        .expect("image");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(test_support::read_bytes(response).await, test_support::PNG_PIXEL);

    let diagram_id = body["id"].as_i64().expect("diagram id");
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/questions/diagram/{diagram_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, &image_url, Some(&student_token), None))
        .await
        .expect("image after delete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn diagram_upload_rejects_mismatched_mime_and_oversized_files() {
    let ctx = test_support::setup_test_context().await;
    let (token, _) = teacher_token(&ctx).await;

    let request = test_support::multipart_request(
        "/api/questions/diagrams",
        &token,
        &[
            ("subject", None, None, &b"Biology"[..]),
            ("year", None, None, &b"2024"[..]),
            ("question_text", None, None, &b"Label the cell."[..]),
            ("file", Some("cell.png"), Some("image/jpeg"), test_support::PNG_PIXEL),
        ],
    );
    let response = ctx.app.clone().oneshot(request).await.expect("upload");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let oversized = vec![0u8; 1024 * 1024 + 1];
    let request = test_support::multipart_request(
        "/api/questions/diagrams",
        &token,
        &[
            ("subject", None, None, &b"Biology"[..]),
            ("year", None, None, &b"2024"[..]),
            ("question_text", None, None, &b"Label the cell."[..]),
            ("file", Some("cell.png"), Some("image/png"), oversized.as_slice()),
        ],
    );
    let response = ctx.app.oneshot(request).await.expect("upload");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn questions_can_be_updated_and_deleted_by_kind() {
    let ctx = test_support::setup_test_context().await;
    let (token, teacher_id) = teacher_token(&ctx).await;
    let question =
        test_support::insert_subjective(ctx.state.db(), "Math", 2020, "long", "Prove it.", &teacher_id)
            .await;
    let mcq = test_support::insert_mcq(ctx.state.db(), "Math", "2 + 2", 'B', &teacher_id).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/questions/subjective/{}", question.id),
            Some(&token),
            Some(json!({ "question_text": "Prove it twice.", "year": 2021 })),
        ))
        .await
        .expect("update");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["question_text"], "Prove it twice.");
    assert_eq!(body["year"], 2021);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/questions/mcq/{}", mcq.id),
            Some(&token),
            Some(json!({ "correct_answer": "d", "option_d": "Four" })),
        ))
        .await
        .expect("update mcq");
    let body = test_support::read_json(response).await;
    assert_eq!(body["correct_answer"], "D");
    assert_eq!(body["options"][3]["text"], "Four");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/questions/subjective/{}", question.id),
            Some(&token),
            Some(json!({ "option_a": "nope" })),
        ))
        .await
        .expect("update with mcq fields");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/questions/essay/{}", question.id),
            Some(&token),
            None,
        ))
        .await
        .expect("unknown kind");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/questions/subjective/{}", question.id);
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::DELETE, &uri, Some(&token), None))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::DELETE, &uri, Some(&token), None))
        .await
        .expect("delete again");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn subjects_named_like_bank_routes_are_searchable() {
    let ctx = test_support::setup_test_context().await;
    let (token, teacher_id) = teacher_token(&ctx).await;
    test_support::insert_subjective(ctx.state.db(), "MCQ", 2024, "short", "What is a distractor?", &teacher_id)
        .await;
    test_support::insert_mcq(ctx.state.db(), "Diagrams", "Best chart for ratios", 'B', &teacher_id).await;

    for (uri, expected) in [
        ("/api/questions/mcq", ("subjective", "What is a distractor?")),
        ("/api/questions/diagrams", ("mcqs", "Best chart for ratios")),
    ] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::GET, uri, Some(&token), None))
            .await
            .expect("search");
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = test_support::read_json(response).await;
        assert_eq!(body[expected.0][0]["question_text"], expected.1, "{uri}");
        assert_eq!(body["total_questions"], 1, "{uri}");
    }

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/questions/subjective", Some(&token), None))
        .await
        .expect("search");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(test_support::read_json(response).await["total_questions"], 0);
}

#[tokio::test]
async fn huge_page_number_returns_an_empty_page() {
    let ctx = test_support::setup_test_context().await;
    let (token, teacher_id) = teacher_token(&ctx).await;
    test_support::insert_subjective(ctx.state.db(), "Physics", 2024, "long", "Explain inertia.", &teacher_id)
        .await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/questions/Physics?page={}", i64::MAX),
            Some(&token),
            None,
        ))
        .await
        .expect("search");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["subjective"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["pagination"]["subjective"]["total"], 1);
    assert_eq!(body["pagination"]["subjective"]["page"], i64::MAX);
}
