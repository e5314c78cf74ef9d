//! Admin menu routes. Resource paths keep their trailing slash; `meta` has none.

use crate::handlers::admin::{create, delete, list, menu, meta, retrieve, update};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub fn admin_routes(state: AppState) -> Router {
    let body_limit = state.body_limit;
    Router::new()
        .route("/admin/menu/", get(menu))
        .route("/admin/menu/:code/", get(list).post(create))
        .route("/admin/menu/:code/meta", get(meta))
        .route(
            "/admin/menu/:code/:pk/",
            get(retrieve).put(update).delete(delete),
        )
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
