use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::marketdtos::{ApiResponse, CreateRatingDto},
    error::HttpError,
    middleware::{auth, role_check, JWTAuthMiddeware},
    service::access::PARTICIPANTS,
    AppState,
};

/// Reading ratings is public; submitting one needs a session.
pub fn ratings_handler() -> Router {
    let protected = Router::new()
        .route(
            "/",
            post(create_rating).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, PARTICIPANTS.to_vec())
            })),
        )
        .layer(middleware::from_fn(auth));

    Router::new()
        .route("/users/:user_id/ratings", get(get_user_ratings))
        .merge(protected)
}

pub async fn create_rating(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateRatingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let rating = app_state
        .rating_service
        .submit_rating(&user.user, body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Rating submitted successfully", rating)),
    ))
}

pub async fn get_user_ratings(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let ratings = app_state
        .rating_service
        .list_ratings_for_user(user_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Ratings retrieved successfully",
        ratings,
    )))
}
