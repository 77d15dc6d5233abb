use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;
use crate::users::model::User;

/// Resolves the `Authorization` token to the calling user.
///
/// Accepts `Token <key>` and `Bearer <key>`. Anything else, an unknown key or
/// an inactive owner is rejected with 401.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let key = parse_authorization(header).ok_or(AppError::Unauthorized)?;

        match state.tokens.find_user(key).await? {
            Some(user) if user.is_active => Ok(AuthUser(user)),
            Some(user) => {
                warn!(user_id = %user.id, "token for inactive user");
                Err(AppError::Unauthorized)
            }
            None => {
                warn!("unknown token");
                Err(AppError::Unauthorized)
            }
        }
    }
}

fn parse_authorization(header: &str) -> Option<&str> {
    let (scheme, key) = header.trim().split_once(' ')?;
    let key = key.trim();
    let known = scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer");
    (known && !key.is_empty() && !key.contains(' ')).then_some(key)
}
