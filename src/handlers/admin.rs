//! Admin handlers: menu, list, meta, create, retrieve, update, delete.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub search: Option<String>,
}

fn parse_pk(pk: &str) -> Result<i64, AppError> {
    pk.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", pk)))
}

fn body_to_map(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, AppError> {
    let Json(value) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn menu(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.menu())
}

pub async fn list(
    State(state): State<AppState>,
    Path(code): Path<String>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let page = state
        .service
        .list(&code, params.page.unwrap_or(1), params.search)
        .await?;
    Ok(Json(page))
}

pub async fn meta(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.service.meta(&code).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Path(code): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = body_to_map(body)?;
    let created = state.service.create(&code, &payload).await?;
    Ok((StatusCode::OK, Json(created)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path((code, pk)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let pk = parse_pk(&pk)?;
    Ok(Json(state.service.retrieve(&code, pk).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path((code, pk)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let pk = parse_pk(&pk)?;
    let payload = body_to_map(body)?;
    Ok(Json(state.service.update(&code, pk, &payload).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((code, pk)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let pk = parse_pk(&pk)?;
    state.service.delete(&code, pk).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pk_must_be_integer() {
        assert_eq!(parse_pk("42").unwrap(), 42);
        assert!(matches!(parse_pk("abc"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_pk("1.5"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn body_must_be_object() {
        assert!(body_to_map(Ok(Json(serde_json::json!({"a": 1})))).is_ok());
        assert!(matches!(
            body_to_map(Ok(Json(serde_json::json!([1, 2])))),
            Err(AppError::BadRequest(_))
        ));
    }
}
