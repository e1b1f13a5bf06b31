use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::marketdtos::*,
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    service::access::{ADMIN_ONLY, BROWSERS, CLIENT_ONLY},
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        .route(
            "/",
            post(create_job).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, CLIENT_ONLY.to_vec())
            })),
        )
        .route(
            "/",
            get(list_jobs).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, BROWSERS.to_vec())
            })),
        )
        .route(
            "/my-jobs",
            get(list_my_jobs).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, CLIENT_ONLY.to_vec())
            })),
        )
        .route("/:id", get(get_job))
        .route(
            "/:id",
            put(update_job).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, CLIENT_ONLY.to_vec())
            })),
        )
        .route(
            "/:id/close",
            put(close_job).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, CLIENT_ONLY.to_vec())
            })),
        )
        .route(
            "/:id/moderate",
            put(moderate_job).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, ADMIN_ONLY.to_vec())
            })),
        )
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.job_service.create_job(&auth.user, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Job created successfully", job)),
    ))
}

pub async fn list_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(params): Query<JobQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.job_service.list_jobs(&auth.user, params).await?;

    Ok(Json(ApiResponse::success("Jobs retrieved successfully", jobs)))
}

pub async fn list_my_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.job_service.list_client_jobs(&auth.user).await?;

    Ok(Json(ApiResponse::success("Jobs retrieved successfully", jobs)))
}

pub async fn get_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.get_job(job_id).await?;

    Ok(Json(ApiResponse::success("Job retrieved successfully", job)))
}

pub async fn update_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<UpdateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .job_service
        .update_job(job_id, &auth.user, body)
        .await?;

    Ok(Json(ApiResponse::success("Job updated successfully", job)))
}

pub async fn close_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.close_job(job_id, &auth.user).await?;

    Ok(Json(ApiResponse::success("Job closed successfully", job)))
}

pub async fn moderate_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<ModerateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .job_service
        .moderate_job(job_id, &auth.user, body.status)
        .await?;

    Ok(Json(ApiResponse::success("Job status updated", job)))
}
