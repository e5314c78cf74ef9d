mod common;

use axum::http::StatusCode;
use common::{send, setup_test_app};
use serde_json::json;

#[tokio::test]
async fn test_menu_lists_visible_models() {
    let app = setup_test_app();
    let (status, body) = send(&app, "GET", "/admin/menu/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"code": "author", "label": "Authors", "fields": []},
            {"code": "blog-post", "label": "BlogPost", "fields": []}
        ])
    );
}

#[tokio::test]
async fn test_unknown_and_excluded_codes_are_not_found() {
    let app = setup_test_app();
    let (status, body) = send(&app, "GET", "/admin/menu/audit-log/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = send(&app, "GET", "/admin/menu/nothing/meta", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/admin/menu/BlogPost/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_retrieve_update_delete() {
    let app = setup_test_app();

    let (status, body) = send(&app, "POST", "/admin/menu/author/", Some(json!({"name": "Ada"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"pk": 1}));

    let (status, body) = send(
        &app,
        "POST",
        "/admin/menu/blog-post/",
        Some(json!({"title": "Hello", "author": 1, "publish_date": "05.03.2024"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pk"], 1);

    let (status, body) = send(&app, "GET", "/admin/menu/blog-post/1/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Hello");
    assert_eq!(body["author_id"], 1);
    assert_eq!(body["published"], false);
    assert_eq!(body["views"], 0);
    assert_eq!(body["publish_date"], "2024-03-05");
    assert!(body.get("author").is_none());

    let (status, body) = send(
        &app,
        "PUT",
        "/admin/menu/blog-post/1/",
        Some(json!({"published": "true", "views": "7"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["published"], true);
    assert_eq!(body["views"], 7);
    assert_eq!(body["title"], "Hello");

    let (status, _) = send(&app, "DELETE", "/admin/menu/blog-post/1/", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", "/admin/menu/blog-post/1/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/admin/menu/blog-post/1/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_renders_related_display_and_formats() {
    let app = setup_test_app();
    send(&app, "POST", "/admin/menu/author/", Some(json!({"name": "Ada"}))).await;
    send(
        &app,
        "POST",
        "/admin/menu/blog-post/",
        Some(json!({"title": "First", "author": "1", "publish_date": "01.02.2024"})),
    )
    .await;
    send(&app, "POST", "/admin/menu/blog-post/", Some(json!({"title": "Orphan"}))).await;

    let (status, body) = send(&app, "GET", "/admin/menu/blog-post/?page=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["paginator"]["count"], 2);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["title"], "Orphan");
    assert_eq!(data[0]["author"], serde_json::Value::Null);
    assert_eq!(data[1]["author"], "Ada");
    assert_eq!(data[1]["author_id"], 1);
    assert_eq!(data[1]["publish_date"], "01.02.2024");

    let fields = body["meta"]["fields"].as_array().unwrap();
    let author = fields.iter().find(|f| f["name"] == "author").unwrap();
    assert_eq!(author["type"], "related");
    assert!(author.get("choices").is_none());
}

#[tokio::test]
async fn test_meta_lists_choices() {
    let app = setup_test_app();
    send(&app, "POST", "/admin/menu/author/", Some(json!({"name": "Ada"}))).await;
    send(&app, "POST", "/admin/menu/author/", Some(json!({"name": "Grace"}))).await;

    let (status, body) = send(&app, "GET", "/admin/menu/blog-post/meta", None).await;
    assert_eq!(status, StatusCode::OK);
    let fields = body["fields"].as_array().unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["title", "published", "views", "publish_date", "author"]);
    let author = &fields[4];
    assert_eq!(author["choices"], json!([[1, "Ada"], [2, "Grace"]]));
    assert_eq!(author["allow_null"], true);
}

#[tokio::test]
async fn test_write_errors_are_bad_requests() {
    let app = setup_test_app();

    let (status, body) = send(&app, "POST", "/admin/menu/author/", Some(json!({"nickname": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "unknown_field");
    assert_eq!(body["error"]["details"]["field"], "nickname");

    let (status, body) = send(&app, "POST", "/admin/menu/author/", Some(json!({"id": 5, "name": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "unknown_field");

    let (status, body) = send(&app, "POST", "/admin/menu/author/", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_value");

    let (status, body) = send(
        &app,
        "POST",
        "/admin/menu/blog-post/",
        Some(json!({"title": "t", "views": "lots"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field"], "views");

    let (status, _) = send(&app, "POST", "/admin/menu/author/", Some(json!(["Ada"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/admin/menu/author/abc/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_update_missing_record_is_not_found() {
    let app = setup_test_app();
    let (status, _) = send(&app, "PUT", "/admin/menu/author/9/", Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_version() {
    let app = setup_test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    let (status, body) = send(&app, "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "admin-sdk");
}
