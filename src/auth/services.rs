use lazy_static::lazy_static;
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{AuthToken, TokenRepo};
use crate::error::{AppError, AppResult};
use crate::users::{repo::UserRepo, services::check_password, services::normalize_email};

lazy_static! {
    /// Verified against when the email is unknown, so that path costs as much
    /// as a wrong password.
    static ref DUMMY_HASH: String = hash_password("unused-login-placeholder").unwrap_or_default();
}

/// Verifies credentials and hands out the user's token.
///
/// Every rejection is the same `InvalidCredentials`, whether the email is
/// unknown, the password is wrong, a field is missing or the user is inactive.
pub async fn authenticate(
    users: &dyn UserRepo,
    tokens: &dyn TokenRepo,
    email: Option<&str>,
    password: Option<&str>,
) -> AppResult<AuthToken> {
    let (Some(email), Some(password)) = (email, password) else {
        warn!("token request with missing credentials");
        return Err(AppError::InvalidCredentials);
    };
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        warn!("token request with blank credentials");
        return Err(AppError::InvalidCredentials);
    }

    let Some(user) = users.find_by_email(&email).await? else {
        let _ = verify_password(password, &DUMMY_HASH);
        warn!(%email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !check_password(&user, password) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }
    if !user.is_active {
        warn!(user_id = %user.id, "login for inactive user");
        return Err(AppError::InvalidCredentials);
    }

    let token = tokens.get_or_create(user.id).await?;
    info!(user_id = %user.id, "token issued");
    Ok(token)
}
