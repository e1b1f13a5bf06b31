use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::userdtos::{FilterUserDto, UpdateProfileDto, UserData, UserListResponseDto, UserResponseDto},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    service::access::{ADMIN_ONLY, PARTICIPANTS},
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/profile", get(get_profile))
        .route(
            "/profile",
            put(update_profile).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, PARTICIPANTS.to_vec())
            })),
        )
        .route(
            "/",
            get(get_users).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, ADMIN_ONLY.to_vec())
            })),
        )
        .route(
            "/:user_id",
            put(deactivate_user).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, ADMIN_ONLY.to_vec())
            })),
        )
}

pub async fn get_profile(
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        message: "Profile retrieved successfully".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user.user),
        },
    }))
}

pub async fn update_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = user.user;
    let (skills, company) = match user.role {
        UserRole::Freelancer => (body.skills, None),
        _ => (None, body.company),
    };

    let updated = app_state
        .db_client
        .update_user_profile(user.id, body.name, body.bio, skills, company)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        message: "Profile updated successfully".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&updated),
        },
    }))
}

pub async fn get_users(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let users = app_state
        .db_client
        .get_users()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(UserListResponseDto {
        status: "success".to_string(),
        users: FilterUserDto::filter_users(&users),
        results: users.len(),
    }))
}

pub async fn deactivate_user(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let user = app_state
        .db_client
        .deactivate_user(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    tracing::info!("User {} deactivated by admin {}", user.id, admin.user.id);

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        message: "User deactivated successfully".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user),
        },
    }))
}
