use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Holds JWT signing and verification keys with the session policy.
///
/// Built once per use from [`AppState`] via [`FromRef`]; the secret is
/// loaded at startup, never read from the environment per request.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: Duration::from_secs((cfg.ttl_days as u64) * 24 * 60 * 60),
        }
    }

    /// Mint a session token for `user_id`, valid for the configured TTL.
    pub fn issue(&self, user_id: Uuid, email: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "session token issued");
        Ok(token)
    }

    /// Check signature and expiry. Any failure collapses to
    /// [`ApiError::InvalidToken`] so callers cannot tell a forged
    /// token from an expired or garbled one.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| ApiError::InvalidToken)?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            ttl_days: 7,
        })
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = make_keys("dev-secret");
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id, "a@b.com").expect("issue");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@b.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let keys = make_keys("secret-one");
        let other = make_keys("secret-two");
        let token = keys.issue(Uuid::new_v4(), "a@b.com").expect("issue");
        assert!(matches!(
            other.verify(&token),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc();
        // Well past the validation leeway.
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@b.com".into(),
            iat: (now - TimeDuration::hours(2)).unix_timestamp() as usize,
            exp: (now - TimeDuration::hours(1)).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(matches!(keys.verify(&token), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn verify_rejects_malformed_token() {
        let keys = make_keys("dev-secret");
        assert!(matches!(
            keys.verify("not-a-jwt"),
            Err(ApiError::InvalidToken)
        ));
        assert!(matches!(keys.verify(""), Err(ApiError::InvalidToken)));
    }
}
