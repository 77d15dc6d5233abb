use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::users::model::{NewUser, ProfileUpdate, User, UserFlags};
use crate::users::repo::UserRepo;

pub const MAX_NAME_LEN: usize = 255;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn validate_password(password: &str, min_len: usize) -> AppResult<()> {
    if password.chars().count() < min_len {
        return Err(AppError::validation(format!(
            "Password must be at least {min_len} characters"
        )));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> AppResult<()> {
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Creates a user, active unless `flags` says otherwise. The email is normalized and the password hashed
/// before anything reaches the store.
pub async fn create_user(
    users: &dyn UserRepo,
    email: Option<&str>,
    password: &str,
    name: Option<&str>,
    flags: UserFlags,
) -> AppResult<User> {
    let email = email.map(normalize_email).unwrap_or_default();
    if email.is_empty() {
        return Err(AppError::validation("Users must have an email address"));
    }

    let password_hash = hash_password(password)?;
    let user = users
        .insert(NewUser {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name: name.unwrap_or_default().to_string(),
            flags,
        })
        .await?;

    info!(user_id = %user.id, is_staff = user.is_staff, "user created");
    Ok(user)
}

pub async fn create_superuser(users: &dyn UserRepo, email: &str, password: &str) -> AppResult<User> {
    create_user(
        users,
        Some(email),
        password,
        None,
        UserFlags {
            is_staff: true,
            is_superuser: true,
            ..UserFlags::default()
        },
    )
    .await
}

pub fn check_password(user: &User, candidate: &str) -> bool {
    match verify_password(candidate, &user.password_hash) {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, user_id = %user.id, "stored password hash unreadable");
            false
        }
    }
}

pub async fn update_profile(
    users: &dyn UserRepo,
    user: &User,
    update: ProfileUpdate,
) -> AppResult<User> {
    let password_hash = match update.password.as_deref() {
        Some(p) => Some(hash_password(p)?),
        None => None,
    };

    let updated = users
        .update(user.id, update.name.as_deref(), password_hash.as_deref())
        .await?;
    debug!(
        user_id = %user.id,
        name_changed = update.name.is_some(),
        password_changed = password_hash.is_some(),
        "profile updated"
    );
    Ok(updated)
}
