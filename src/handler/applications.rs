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
    dtos::marketdtos::*,
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    service::access::{CLIENT_ONLY, FREELANCER_ONLY},
    AppState,
};

// Path ids: job id under /applications, application id for the transitions
pub fn applications_handler() -> Router {
    Router::new()
        .route(
            "/:id/applications",
            post(submit_application).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, FREELANCER_ONLY.to_vec())
            })),
        )
        .route(
            "/:id/applications",
            get(list_job_applications).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, CLIENT_ONLY.to_vec())
            })),
        )
        .route(
            "/:id/accept",
            put(accept_application).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, CLIENT_ONLY.to_vec())
            })),
        )
        .route(
            "/:id/reject",
            put(reject_application).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, CLIENT_ONLY.to_vec())
            })),
        )
        .route(
            "/:id/withdraw",
            put(withdraw_application).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, FREELANCER_ONLY.to_vec())
            })),
        )
}

pub async fn submit_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<CreateApplicationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let application = app_state
        .application_service
        .submit_application(job_id, &auth.user, body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Application submitted successfully",
            application,
        )),
    ))
}

pub async fn list_job_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let applications = app_state
        .application_service
        .list_applications_for_job(job_id, &auth.user)
        .await?;

    Ok(Json(ApiResponse::success(
        "Applications retrieved successfully",
        applications,
    )))
}

pub async fn accept_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let accepted = app_state
        .application_service
        .accept_application(application_id, &auth.user)
        .await?;

    Ok(Json(ApiResponse::success(
        "Application accepted and contract created",
        accepted,
    )))
}

pub async fn reject_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .application_service
        .reject_application(application_id, &auth.user)
        .await?;

    Ok(Json(ApiResponse::success("Application rejected", application)))
}

pub async fn withdraw_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .application_service
        .withdraw_application(application_id, &auth.user)
        .await?;

    Ok(Json(ApiResponse::success("Application withdrawn", application)))
}
