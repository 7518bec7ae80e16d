/// Integration tests for the StudioPlan API
///
/// These drive the full router (auth middleware, extractors, handlers and
/// error mapping) against the in-memory store:
/// - Session authentication
/// - Owner scoping for every verb
/// - Create defaults and validation
/// - Partial updates
/// - Checklist idempotency, ordering and cascade
/// - Masked settings

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Duration;
use common::{token_for, TestContext};
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_project(ctx: &TestContext, body: Value) -> Value {
    let (status, json) = ctx.send("POST", "/video-projects", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    json["project"].clone()
}

#[tokio::test]
async fn test_unknown_route_and_wrong_method_use_error_body() {
    let ctx = TestContext::new();

    let (status, json) = ctx.send("GET", "/no-such-thing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Route not found");

    let (status, json) = ctx.send("PATCH", "/notes", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Route not found");

    let request = Request::builder()
        .method("DELETE")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, json) = ctx.call(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Route not found");
}

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, json) = ctx.call(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "connected");
}

#[tokio::test]
async fn test_missing_session_is_unauthorized() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .uri("/notes")
        .body(Body::empty())
        .unwrap();
    let (status, json) = ctx.call(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_expired_and_forged_tokens_are_unauthorized() {
    let ctx = TestContext::new();

    let expired = token_for(ctx.user_id, Duration::seconds(-60));
    let (status, _) = ctx.send_as(&expired, "GET", "/tasks", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = ctx.send_as("not-a-jwt", "GET", "/tasks", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .uri("/notes")
        .header("cookie", format!("theme=dark; sb-access-token={}", ctx.token))
        .body(Body::empty())
        .unwrap();
    let (status, json) = ctx.call(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["notes"], json!([]));
}

#[tokio::test]
async fn test_note_defaults_and_lifecycle() {
    let ctx = TestContext::new();

    let (status, json) = ctx.send("POST", "/notes", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["note"]["title"], "Untitled Note");
    assert_eq!(json["note"]["content"], "");
    let id = json["note"]["id"].as_str().unwrap().to_string();

    let (status, json) = ctx
        .send("PUT", &format!("/notes/{}", id), Some(json!({"content": "Draft"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["note"]["title"], "Untitled Note");
    assert_eq!(json["note"]["content"], "Draft");

    let (status, json) = ctx.send("DELETE", &format!("/notes/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, _) = ctx.send("GET", &format!("/notes/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_foreign_rows_are_not_found_for_every_verb() {
    let ctx = TestContext::new();
    let intruder = token_for(Uuid::new_v4(), Duration::hours(1));

    let (_, note) = ctx.send("POST", "/notes", Some(json!({"title": "Mine"}))).await;
    let (_, task) = ctx.send("POST", "/tasks", Some(json!({"title": "Mine"}))).await;
    let project = create_project(&ctx, json!({"title": "Mine"})).await;

    let uris = [
        format!("/notes/{}", note["note"]["id"].as_str().unwrap()),
        format!("/tasks/{}", task["task"]["id"].as_str().unwrap()),
        format!("/video-projects/{}", project["id"].as_str().unwrap()),
    ];

    for uri in &uris {
        let (status, json) = ctx.send_as(&intruder, "GET", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {}", uri);
        assert!(json["error"].is_string());

        let (status, _) = ctx
            .send_as(&intruder, "PUT", uri, Some(json!({"title": "Stolen"})))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "PUT {}", uri);

        let (status, _) = ctx.send_as(&intruder, "DELETE", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {}", uri);
    }

    // Owner still sees everything untouched
    for uri in &uris {
        let (status, json) = ctx.send("GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let row = json.as_object().unwrap().values().next().unwrap();
        assert_eq!(row["title"], "Mine");
    }

    let (status, json) = ctx.send_as(&intruder, "GET", "/notes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["notes"], json!([]));
}

#[tokio::test]
async fn test_task_title_is_required() {
    let ctx = TestContext::new();

    for body in [json!({"title": ""}), json!({"title": "   "}), json!({})] {
        let (status, json) = ctx.send("POST", "/tasks", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }
}

#[tokio::test]
async fn test_task_create_applies_defaults() {
    let ctx = TestContext::new();

    let (status, json) = ctx
        .send("POST", "/tasks", Some(json!({"title": "Edit intro"})))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let task = &json["task"];
    assert_eq!(task["title"], "Edit intro");
    assert_eq!(task["status"], "todo");
    assert_eq!(task["progress"], 0);
    assert_eq!(task["tags"], json!([]));
    assert_eq!(task["assignees"], json!([]));
    assert_eq!(task["user_id"], ctx.user_id.to_string());
    assert!(task["id"].is_string());
}

#[tokio::test]
async fn test_task_list_filters_by_status() {
    let ctx = TestContext::new();

    ctx.send("POST", "/tasks", Some(json!({"title": "A"}))).await;
    ctx.send("POST", "/tasks", Some(json!({"title": "B", "status": "done"})))
        .await;
    ctx.send("POST", "/tasks", Some(json!({"title": "C"}))).await;

    let (status, json) = ctx.send("GET", "/tasks?status=todo", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = json["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["C", "A"]);

    let (status, _) = ctx.send("GET", "/tasks?status=archived", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_task_update_rejects_blank_title_and_bad_progress() {
    let ctx = TestContext::new();
    let (_, json) = ctx.send("POST", "/tasks", Some(json!({"title": "A"}))).await;
    let uri = format!("/tasks/{}", json["task"]["id"].as_str().unwrap());

    let (status, _) = ctx.send("PUT", &uri, Some(json!({"title": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx.send("PUT", &uri, Some(json!({"progress": 140}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = ctx
        .send("PUT", &uri, Some(json!({"status": "in_review", "progress": 80})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["task"]["status"], "in_review");
    assert_eq!(json["task"]["title"], "A");
}

#[tokio::test]
async fn test_malformed_input_is_bad_request() {
    let ctx = TestContext::new();

    let (status, json) = ctx.send("GET", "/notes/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/tasks")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = ctx.call(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_project_partial_update_leaves_other_fields() {
    let ctx = TestContext::new();
    let project = create_project(
        &ctx,
        json!({
            "title": "Original",
            "hook": "You won't believe this",
            "rough_sketch": "Open on the desk",
            "status": "filming",
            "progress": 40,
            "notes": "Bring the tripod",
            "production_date": "2025-11-15",
            "release_date": "2025-11-20"
        }),
    )
    .await;
    let uri = format!("/video-projects/{}", project["id"].as_str().unwrap());

    let (status, json) = ctx.send("PUT", &uri, Some(json!({"title": "X"}))).await;
    assert_eq!(status, StatusCode::OK);

    let updated = &json["project"];
    assert_eq!(updated["title"], "X");
    for field in [
        "hook",
        "rough_sketch",
        "status",
        "progress",
        "notes",
        "production_date",
        "release_date",
        "generated_concept",
        "created_at",
    ] {
        assert_eq!(updated[field], project[field], "field {} changed", field);
    }
}

#[tokio::test]
async fn test_project_update_null_clears_field() {
    let ctx = TestContext::new();
    let project = create_project(
        &ctx,
        json!({"title": "Clearable", "hook": "Hook", "release_date": "2025-11-20"}),
    )
    .await;
    let uri = format!("/video-projects/{}", project["id"].as_str().unwrap());

    let (status, json) = ctx
        .send("PUT", &uri, Some(json!({"hook": null, "release_date": ""})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["project"]["hook"], Value::Null);
    assert_eq!(json["project"]["release_date"], Value::Null);
    assert_eq!(json["project"]["title"], "Clearable");
}

#[tokio::test]
async fn test_note_update_null_content_empties_it() {
    let ctx = TestContext::new();
    let (_, created) = ctx
        .send("POST", "/notes", Some(json!({"title": "Draft", "content": "body"})))
        .await;
    let uri = format!("/notes/{}", created["note"]["id"].as_str().unwrap());

    let (status, json) = ctx.send("PUT", &uri, Some(json!({"content": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["note"]["content"], "");
    assert_eq!(json["note"]["title"], "Draft");
}

#[tokio::test]
async fn test_task_update_null_lists_clear_them() {
    let ctx = TestContext::new();
    let (_, created) = ctx
        .send(
            "POST",
            "/tasks",
            Some(json!({"title": "Edit intro", "tags": ["a", "b"], "assignees": ["x"]})),
        )
        .await;
    let uri = format!("/tasks/{}", created["task"]["id"].as_str().unwrap());

    let (status, json) = ctx
        .send("PUT", &uri, Some(json!({"tags": null, "assignees": null})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["task"]["tags"], json!([]));
    assert_eq!(json["task"]["assignees"], json!([]));
    assert_eq!(json["task"]["title"], "Edit intro");
}

#[tokio::test]
async fn test_project_create_defaults_and_required_title() {
    let ctx = TestContext::new();

    let (status, _) = ctx
        .send("POST", "/video-projects", Some(json!({"title": " "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let project = create_project(&ctx, json!({"title": "New", "hook": "  "})).await;
    assert_eq!(project["status"], "ideation");
    assert_eq!(project["progress"], 0);
    assert_eq!(project["hook"], Value::Null);
    assert_eq!(project["generated_concept"], Value::Null);
}

#[tokio::test]
async fn test_checklist_create_is_idempotent() {
    let ctx = TestContext::new();
    let project = create_project(&ctx, json!({"title": "Checklist"})).await;
    let uri = format!("/video-projects/{}/checklist", project["id"].as_str().unwrap());
    let body = json!({"text": "Write script", "category": "Ideation"});

    let (status, first) = ctx.send("POST", &uri, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, second) = ctx.send("POST", &uri, Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["item"]["id"], second["item"]["id"]);

    assert_eq!(ctx.store.checklist_len().await, 1);
}

#[tokio::test]
async fn test_checklist_default_display_order() {
    let ctx = TestContext::new();
    let project = create_project(&ctx, json!({"title": "Ordering"})).await;
    let uri = format!("/video-projects/{}/checklist", project["id"].as_str().unwrap());

    for text in ["One", "Two", "Three"] {
        ctx.send("POST", &uri, Some(json!({"text": text, "category": "Filming"})))
            .await;
    }

    let (status, json) = ctx.send("GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let items: Vec<(String, i64)> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| {
            (
                i["text"].as_str().unwrap().to_string(),
                i["display_order"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        items,
        vec![
            ("One".to_string(), 0),
            ("Two".to_string(), 1),
            ("Three".to_string(), 2)
        ]
    );
}

#[tokio::test]
async fn test_checklist_requires_owned_project_and_text() {
    let ctx = TestContext::new();
    let project = create_project(&ctx, json!({"title": "Guarded"})).await;
    let uri = format!("/video-projects/{}/checklist", project["id"].as_str().unwrap());

    let (status, _) = ctx
        .send("POST", &uri, Some(json!({"text": "  ", "category": "Ideation"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let intruder = token_for(Uuid::new_v4(), Duration::hours(1));
    let (status, _) = ctx
        .send_as(
            &intruder,
            "POST",
            &uri,
            Some(json!({"text": "Sneak", "category": "Ideation"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.send_as(&intruder, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checklist_update_and_delete() {
    let ctx = TestContext::new();
    let project = create_project(&ctx, json!({"title": "Toggle"})).await;
    let uri = format!("/video-projects/{}/checklist", project["id"].as_str().unwrap());

    let (_, created) = ctx
        .send("POST", &uri, Some(json!({"text": "Shoot B-roll", "category": "Filming"})))
        .await;
    let item_id = created["item"]["id"].as_str().unwrap().to_string();

    let (status, json) = ctx.send("PUT", &uri, Some(json!({"completed": true}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("item_id"));

    let (status, json) = ctx
        .send("PUT", &uri, Some(json!({"item_id": item_id, "completed": true})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["item"]["completed"], true);
    assert_eq!(json["item"]["text"], "Shoot B-roll");

    let (status, json) = ctx
        .send("DELETE", &format!("{}/{}", uri, item_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, _) = ctx
        .send("DELETE", &format!("{}/{}", uri, item_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_project_delete_removes_checklist() {
    let ctx = TestContext::new();
    let project = create_project(&ctx, json!({"title": "Doomed"})).await;
    let id = project["id"].as_str().unwrap();
    let uri = format!("/video-projects/{}/checklist", id);

    ctx.send("POST", &uri, Some(json!({"text": "A", "category": "Ideation"})))
        .await;
    ctx.send("POST", &uri, Some(json!({"text": "B", "category": "Ideation"})))
        .await;
    assert_eq!(ctx.store.checklist_len().await, 2);

    let (status, _) = ctx
        .send("DELETE", &format!("/video-projects/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctx.store.checklist_len().await, 0);
}

#[tokio::test]
async fn test_settings_key_is_masked() {
    let ctx = TestContext::new();

    let (status, json) = ctx.send("GET", "/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["settings"]["gemini_api_key"], Value::Null);
    assert_eq!(json["settings"]["user_id"], ctx.user_id.to_string());

    let (status, json) = ctx
        .send("PUT", "/settings", Some(json!({"gemini_api_key": "secret123"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["settings"]["gemini_api_key"], "***");

    let (_, json) = ctx.send("GET", "/settings", None).await;
    assert_eq!(json["settings"]["gemini_api_key"], "***");
    assert!(!json.to_string().contains("secret123"));

    // The raw value is still available to generation
    let project = create_project(&ctx, json!({"title": "Keyed"})).await;
    let (status, _) = ctx
        .send(
            "POST",
            "/video-projects/generate-concept",
            Some(json!({"video_project_id": project["id"], "title": "Keyed"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ctx.generator.last_key.lock().unwrap().as_deref(),
        Some("secret123")
    );
}

#[tokio::test]
async fn test_store_failure_is_generic_500() {
    let ctx = TestContext::new();
    ctx.store.set_fail_writes(true);

    let (status, json) = ctx.send("POST", "/notes", Some(json!({"title": "x"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}
