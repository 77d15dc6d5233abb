use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{extractors::AuthUser, services::authenticate},
    error::{method_not_allowed, AppError, AppResult},
    extract::ApiJson,
    state::AppState,
    users::{
        dto::{CreateUserRequest, PublicUser, TokenRequest, TokenResponse, UpdateProfileRequest},
        model::{ProfileUpdate, UserFlags},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/create", post(create_user).fallback(method_not_allowed))
        .route("/users/token", post(create_token).fallback(method_not_allowed))
        .route(
            "/users/profile",
            get(get_profile)
                .patch(update_profile)
                .fallback(method_not_allowed),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let email = payload
        .email
        .as_deref()
        .map(services::normalize_email)
        .unwrap_or_default();
    if email.is_empty() {
        return Err(AppError::validation("Email is required"));
    }
    if !services::is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::validation("Enter a valid email address"));
    }

    let password = payload
        .password
        .ok_or_else(|| AppError::validation("Password is required"))?;
    services::validate_password(&password, state.config.password_min_length)?;

    if let Some(name) = payload.name.as_deref() {
        services::validate_name(name)?;
    }

    let user = services::create_user(
        state.users.as_ref(),
        Some(email.as_str()),
        &password,
        payload.name.as_deref(),
        UserFlags::default(),
    )
    .await?;

    info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn create_token(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = authenticate(
        state.users.as_ref(),
        state.tokens.as_ref(),
        payload.email.as_deref(),
        payload.password.as_deref(),
    )
    .await?;
    Ok(Json(TokenResponse { token: token.key }))
}

#[instrument(skip(user))]
pub async fn get_profile(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(user.into())
}

#[instrument(skip(state, user, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> AppResult<Json<PublicUser>> {
    if let Some(password) = payload.password.as_deref() {
        services::validate_password(password, state.config.password_min_length)?;
    }
    if let Some(name) = payload.name.as_deref() {
        services::validate_name(name)?;
    }

    let updated = services::update_profile(
        state.users.as_ref(),
        &user,
        ProfileUpdate {
            name: payload.name,
            password: payload.password,
        },
    )
    .await?;
    Ok(Json(updated.into()))
}
