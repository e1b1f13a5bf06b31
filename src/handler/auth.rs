use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::Cookie;
use validator::Validate;

use crate::{
    dtos::userdtos::{LoginUserDto, RegisterUserDto, UserLoginResponseDto},
    error::{ErrorMessage, HttpError},
    models::usermodel::{User, UserRole},
    utils::{password, token},
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if body.role == UserRole::Admin {
        return Err(HttpError::bad_request("Role must be client or freelancer"));
    }

    let existing_user = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing_user.is_some() {
        return Err(HttpError::bad_request(ErrorMessage::EmailExist.to_string()));
    }

    let hashed_password =
        password::hash(&body.password).map_err(|e| HttpError::server_error(e.to_string()))?;

    let (skills, company) = match body.role {
        UserRole::Freelancer => (body.skills.unwrap_or_default(), None),
        _ => (Vec::new(), body.company),
    };

    let user = app_state
        .db_client
        .save_user(
            body.name,
            body.email,
            hashed_password,
            body.role,
            body.bio,
            skills,
            company,
        )
        .await
        .map_err(|e| {
            if crate::service::error::is_unique_violation(&e) {
                HttpError::bad_request(ErrorMessage::EmailExist.to_string())
            } else {
                HttpError::server_error(e.to_string())
            }
        })?;

    tracing::info!("Registered {} account {}", user.role.to_str(), user.id);

    token_response(
        &app_state,
        &user,
        "User registered successfully",
        StatusCode::CREATED,
    )
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let result = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let user = result
        .filter(|user| user.is_active)
        .ok_or(HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    let password_matched = password::compare(&body.password, &user.password)
        .map_err(|_| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        return Err(HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()));
    }

    token_response(&app_state, &user, "Login successful", StatusCode::OK)
}

/// Issues a token for `user`, returned in the body and as an http-only cookie.
fn token_response(
    app_state: &AppState,
    user: &User,
    message: &str,
    status: StatusCode,
) -> Result<Response, HttpError> {
    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(time::Duration::minutes(app_state.env.jwt_maxage))
        .http_only(true)
        .build();
    let cookie_header = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut response = (
        status,
        Json(UserLoginResponseDto::new(message, token, user)),
    )
        .into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, cookie_header);

    Ok(response)
}
