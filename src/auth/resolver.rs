use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use tracing::debug;
use uuid::Uuid;

use super::jwt::JwtKeys;
use super::session::read_cookie;

/// An authenticated caller, resolved from a verified session token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// Resolve the caller's identity from the request headers.
///
/// Checks the `Authorization: Bearer` header first, then the session
/// cookie, so the same protected resource serves programmatic clients
/// and browsers uniformly. Verification failures degrade to anonymous
/// (`None`) rather than erroring.
pub fn resolve(headers: &HeaderMap, keys: &JwtKeys, cookie_name: &str) -> Option<Identity> {
    if let Some(token) = bearer_token(headers) {
        match keys.verify(token) {
            Ok(claims) => {
                return Some(Identity {
                    user_id: claims.sub,
                    email: claims.email,
                })
            }
            Err(_) => debug!("invalid bearer token"),
        }
    }

    if let Some(token) = read_cookie(headers, cookie_name) {
        match keys.verify(&token) {
            Ok(claims) => {
                return Some(Identity {
                    user_id: claims.sub,
                    email: claims.email,
                })
            }
            Err(_) => debug!("invalid session cookie"),
        }
    }

    None
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
}
