#![allow(dead_code)]

use admin_sdk::{
    admin_routes, common_routes, resolve, AdminService, AppState, MemoryRepository, ModelRegistry,
    ModelsConfig, Repository,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub fn blog_config() -> ModelsConfig {
    serde_json::from_value(json!({"models": [
        {
            "name": "Author",
            "verbose_name_plural": "Authors",
            "display_field": "name",
            "search_fields": ["name"],
            "fields": [
                {"name": "id", "type": "int", "generated": true},
                {"name": "name", "type": "string", "max_length": 50},
                {"name": "created_at", "type": "datetime", "auto_now_add": true}
            ]
        },
        {
            "name": "BlogPost",
            "fields": [
                {"name": "id", "type": "int", "generated": true},
                {"name": "title", "type": "string"},
                {"name": "published", "type": "bool", "default": false},
                {"name": "views", "type": "int", "default": 0},
                {"name": "publish_date", "type": "date", "null": true},
                {"name": "author", "type": "foreign_key", "related_model": "Author", "null": true},
                {"name": "updated_at", "type": "datetime", "auto_now": true}
            ]
        },
        {
            "name": "AuditLog",
            "fields": [
                {"name": "id", "type": "int", "generated": true},
                {"name": "message", "type": "string"}
            ]
        }
    ]}))
    .unwrap()
}

pub fn blog_registry() -> ModelRegistry {
    resolve(&blog_config(), &["AuditLog".to_string()]).unwrap()
}

pub fn setup_service() -> (AdminService, Arc<MemoryRepository>) {
    let repo = Arc::new(MemoryRepository::new());
    let dyn_repo: Arc<dyn Repository> = repo.clone();
    (AdminService::new(Arc::new(blog_registry()), dyn_repo), repo)
}

pub fn setup_test_app() -> Router {
    let (service, _) = setup_service();
    common_routes().merge(admin_routes(AppState::new(service)))
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
