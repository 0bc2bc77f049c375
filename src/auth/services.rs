use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{info, warn};

use super::google::ExternalIdentity;
use super::jwt::JwtKeys;
use super::password::{hash_password, verify_password};
use super::repo::User;
use crate::error::{ApiError, ApiResult};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Create a local account. Does not mint a session: registration and
/// login are deliberately separate steps.
pub async fn register(db: &PgPool, email: &str, password: &str) -> ApiResult<User> {
    let email = email.trim();

    if !is_valid_email(email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    if User::find_by_email(db, email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(password)?;
    // A concurrent registration can still slip past the pre-check; the
    // unique index picks the winner and the loser surfaces as 409.
    let user = User::create_local(db, email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Validate email + password against the store and mint a session
/// token. Users created through an external provider carry no
/// password credential and can never log in this way.
pub async fn login(
    db: &PgPool,
    keys: &JwtKeys,
    email: &str,
    password: &str,
    ip: Option<&str>,
) -> ApiResult<(String, User)> {
    let email = email.trim();

    if !is_valid_email(email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if password.is_empty() {
        return Err(ApiError::Validation("Password is required".into()));
    }

    let user = match User::find_by_email(db, email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::UserNotFound);
        }
    };

    let Some(hash) = user.password_hash.as_deref() else {
        warn!(user_id = %user.id, "login attempt on external-only account");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(password, hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    User::record_login(db, user.id, ip).await?;
    let token = keys.issue(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((token, user))
}

/// Resolve a verified external identity to a canonical user record.
///
/// Lookup order: external id, then email. An email match auto-links
/// the external id onto the existing account, since the provider has
/// already proven control of that address. Idempotent: the same
/// identity always converges to the same user.
pub async fn external_login(db: &PgPool, identity: &ExternalIdentity) -> ApiResult<User> {
    if let Some(user) = User::find_by_google_id(db, &identity.id).await? {
        info!(user_id = %user.id, "external login");
        return Ok(user);
    }

    if let Some(user) = User::find_by_email(db, &identity.email).await? {
        let user = User::link_google(db, user.id, &identity.id).await?;
        info!(user_id = %user.id, "linked external identity to existing account");
        return Ok(user);
    }

    let user = User::create_external(db, &identity.email, &identity.id).await?;
    info!(user_id = %user.id, email = %user.email, "user created from external identity");
    Ok(user)
}
