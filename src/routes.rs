use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        applications::applications_handler, auth::auth_handler,
        contracts::contracts_handler, disputes::disputes_handler, jobs::jobs_handler,
        ratings::ratings_handler, users::users_handler,
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest(
            "/users",
            auth_handler().merge(users_handler().layer(middleware::from_fn(auth))),
        )
        .nest("/jobs", jobs_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/applications",
            applications_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/contracts",
            contracts_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/disputes",
            disputes_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/ratings", ratings_handler())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
