use serde::Deserialize;
use tracing::warn;

use crate::config::GoogleConfig;
use crate::error::ApiError;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Identity asserted by Google after a completed code exchange.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: String,
}

fn redirect_uri(origin: &str) -> String {
    format!("{origin}/api/auth/google")
}

/// Consent-screen URL the browser is sent to when no code is present.
pub fn authorize_url(cfg: &GoogleConfig, origin: &str) -> String {
    let url = reqwest::Url::parse_with_params(
        AUTH_ENDPOINT,
        &[
            ("client_id", cfg.client_id.as_str()),
            ("redirect_uri", redirect_uri(origin).as_str()),
            ("response_type", "code"),
            ("scope", "openid email profile"),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .expect("static endpoint URL is valid");
    url.to_string()
}

/// Exchange an authorization code for the caller's Google identity.
///
/// Every failure collapses to [`ApiError::ExternalAuthFailure`]; the
/// provider's error detail is logged server-side and never reaches
/// the client.
pub async fn exchange_code(
    cfg: &GoogleConfig,
    origin: &str,
    code: &str,
) -> Result<ExternalIdentity, ApiError> {
    let client = reqwest::Client::new();

    let redirect_uri = redirect_uri(origin);
    let params = [
        ("code", code),
        ("client_id", cfg.client_id.as_str()),
        ("client_secret", cfg.client_secret.as_str()),
        ("redirect_uri", redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
    ];

    let token: TokenResponse = client
        .post(TOKEN_ENDPOINT)
        .form(&params)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            warn!(error = %e, "google code exchange failed");
            ApiError::ExternalAuthFailure
        })?
        .json()
        .await
        .map_err(|e| {
            warn!(error = %e, "google token response malformed");
            ApiError::ExternalAuthFailure
        })?;

    let user: GoogleUser = client
        .get(USERINFO_ENDPOINT)
        .bearer_auth(&token.access_token)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            warn!(error = %e, "google userinfo fetch failed");
            ApiError::ExternalAuthFailure
        })?
        .json()
        .await
        .map_err(|e| {
            warn!(error = %e, "google userinfo response malformed");
            ApiError::ExternalAuthFailure
        })?;

    Ok(ExternalIdentity {
        id: user.id,
        email: user.email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_oauth_params() {
        let cfg = GoogleConfig {
            client_id: "client-123".into(),
            client_secret: "secret".into(),
        };
        let url = authorize_url(&cfg, "http://localhost:8080");
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fapi%2Fauth%2Fgoogle"));
        assert!(!url.contains("secret"));
    }
}
