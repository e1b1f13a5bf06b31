use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::marketdtos::{ApiResponse, CreateDisputeDto, ResolveDisputeDto},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    service::access::{ADMIN_ONLY, PARTICIPANTS},
    AppState,
};

pub fn disputes_handler() -> Router {
    Router::new()
        .route(
            "/",
            post(create_dispute).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, PARTICIPANTS.to_vec())
            })),
        )
        .route(
            "/admin/disputes",
            get(get_all_disputes).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, ADMIN_ONLY.to_vec())
            })),
        )
        .route(
            "/admin/disputes/:id/resolve",
            put(resolve_dispute).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, ADMIN_ONLY.to_vec())
            })),
        )
}

pub async fn create_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let dispute = app_state
        .dispute_service
        .create_dispute(&auth.user, body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Dispute created successfully", dispute)),
    ))
}

pub async fn get_all_disputes(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let disputes = app_state
        .dispute_service
        .list_all_disputes(&auth.user)
        .await?;

    Ok(Json(ApiResponse::success(
        "Disputes retrieved successfully",
        disputes,
    )))
}

pub async fn resolve_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(dispute_id): Path<Uuid>,
    Json(body): Json<ResolveDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let dispute = app_state
        .dispute_service
        .resolve_dispute(dispute_id, &auth.user, body)
        .await?;

    Ok(Json(ApiResponse::success("Dispute resolved", dispute)))
}
