use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    dtos::marketdtos::ApiResponse,
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    service::access::{CLIENT_ONLY, PARTICIPANTS},
    AppState,
};

pub fn contracts_handler() -> Router {
    Router::new()
        .route(
            "/active",
            get(get_active_contracts).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, PARTICIPANTS.to_vec())
            })),
        )
        .route(
            "/:id/complete",
            put(complete_contract).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, CLIENT_ONLY.to_vec())
            })),
        )
        .route(
            "/:id/terminate",
            put(terminate_contract).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, CLIENT_ONLY.to_vec())
            })),
        )
}

pub async fn get_active_contracts(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let contracts = app_state
        .contract_service
        .list_active_contracts(&auth.user)
        .await?;

    Ok(Json(ApiResponse::success(
        "Active contracts retrieved successfully",
        contracts,
    )))
}

pub async fn complete_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = app_state
        .contract_service
        .complete_contract(contract_id, &auth.user)
        .await?;

    Ok(Json(ApiResponse::success("Contract completed", contract)))
}

pub async fn terminate_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = app_state
        .contract_service
        .terminate_contract(contract_id, &auth.user)
        .await?;

    Ok(Json(ApiResponse::success("Contract terminated", contract)))
}
