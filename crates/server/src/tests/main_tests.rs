use super::*;
use axum::{body, body::Body, http::Request};
use tower::ServiceExt;

const TEST_BODY_LIMIT: usize = 64 * 1024;

async fn test_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let api = ApiContext { storage };
    let app = build_router(Arc::new(AppState { api: api.clone() }), TEST_BODY_LIMIT);
    (app, api.storage)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    let body = body.to_string();
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn create_list_and_publish_routes_work() {
    let (app, _storage) = test_app().await;

    let create = json_request(
        "POST",
        "/projects",
        serde_json::json!({
            "name": "My Landing Page",
            "preview_url": "/placeholder.svg",
            "file_content": "<html></html>",
            "file_name": "My Landing Page.html",
            "file_size": 37 * 1024,
        }),
    );
    let response = app.clone().oneshot(create).await.expect("create response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Project = read_json(response).await;
    assert_eq!(created.name, "My Landing Page");
    assert_eq!(created.file_size, Some(37 * 1024));
    assert!(!created.published);

    let publish = json_request(
        "PUT",
        &format!("/projects/{}", created.id),
        serde_json::json!({
            "published": true,
            "published_url": "https://my-landing-page.dev",
        }),
    );
    let response = app.clone().oneshot(publish).await.expect("publish response");
    assert_eq!(response.status(), StatusCode::OK);
    let published: Project = read_json(response).await;
    assert!(published.published);
    assert_eq!(
        published.published_url.as_deref(),
        Some("https://my-landing-page.dev")
    );

    let list = Request::get("/projects").body(Body::empty()).expect("request");
    let response = app.oneshot(list).await.expect("list response");
    assert_eq!(response.status(), StatusCode::OK);
    let projects: Vec<Project> = read_json(response).await;
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0], published);
}

#[tokio::test]
async fn list_body_uses_snake_case_fields_without_file_content() {
    let (app, storage) = test_app().await;
    storage
        .create_project(&storage::NewProject {
            name: "Shop".to_string(),
            preview_url: "/placeholder.svg".to_string(),
            file_content: "secret markup".to_string(),
            file_name: "shop.html".to_string(),
            file_size: 13,
        })
        .await
        .expect("seed");

    let response = app
        .oneshot(Request::get("/projects").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let body: serde_json::Value = read_json(response).await;
    let first = &body[0];
    assert_eq!(first["preview_url"], "/placeholder.svg");
    assert_eq!(first["file_name"], "shop.html");
    assert!(first.get("created_at").is_some());
    assert!(first.get("file_content").is_none());
}

#[tokio::test]
async fn unknown_project_returns_not_found_error_body() {
    let (app, _storage) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/projects/999",
            serde_json::json!({ "published": true, "published_url": "https://x.dev" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::NotFound);

    let response = app
        .oneshot(
            Request::get("/projects/999")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_route_removes_project() {
    let (app, storage) = test_app().await;
    let created = storage
        .create_project(&storage::NewProject {
            name: "Temp".to_string(),
            preview_url: "/placeholder.svg".to_string(),
            file_content: String::new(),
            file_name: "temp.html".to_string(),
            file_size: 0,
        })
        .await
        .expect("seed");

    let delete = Request::delete(format!("/projects/{}", created.project_id))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(delete).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let again = Request::delete(format!("/projects/{}", created.project_id))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(again).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(storage.list_projects().await.expect("list").is_empty());
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let (app, storage) = test_app().await;
    let content = "x".repeat(TEST_BODY_LIMIT + 1);
    let response = app
        .oneshot(json_request(
            "POST",
            "/projects",
            serde_json::json!({ "name": "Huge", "file_content": content }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::PayloadTooLarge);
    assert!(storage.list_projects().await.expect("list").is_empty());
}

#[tokio::test]
async fn invalid_update_returns_bad_request() {
    let (app, storage) = test_app().await;
    let created = storage
        .create_project(&storage::NewProject {
            name: "Draft".to_string(),
            preview_url: "/placeholder.svg".to_string(),
            file_content: String::new(),
            file_name: "draft.html".to_string(),
            file_size: 0,
        })
        .await
        .expect("seed");

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/projects/{}", created.project_id),
            serde_json::json!({ "published": false, "published_url": "https://draft.dev" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
