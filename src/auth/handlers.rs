use axum::{
    extract::{FromRef, Query, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, instrument};

use crate::{
    auth::{
        dto::{GoogleCallbackQuery, LoginRequest, LoginResponse, PublicUser, RegisterRequest,
              StatusResponse},
        google, services,
        jwt::JwtKeys,
        session,
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/google", get(google_callback))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let user = services::register(&state.db, &payload.email, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Response> {
    let keys = JwtKeys::from_ref(&state);
    let ip = client_ip(&headers);

    let (token, user) =
        services::login(&state.db, &keys, &payload.email, &payload.password, ip.as_deref())
            .await?;

    let response = Json(LoginResponse {
        token: token.clone(),
        user: user.into(),
    });
    Ok(([(SET_COOKIE, session_cookie(&state, &token)?)], response).into_response())
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> ApiResult<Response> {
    let name = session::cookie_name(state.config.production);
    let cookie = session::clear_session_cookie(&name, state.config.production);
    let cookie = HeaderValue::from_str(&cookie).map_err(anyhow::Error::from)?;

    let response = Json(StatusResponse {
        success: true,
        message: "Successfully logged out".into(),
    });
    Ok(([(SET_COOKIE, cookie)], response).into_response())
}

/// Google OAuth entry point and callback in one route: without a code
/// the browser is bounced to the consent screen; with one, the code is
/// exchanged and the resulting identity logged in. Any failure past
/// the configuration check redirects to the login page with a generic
/// error indicator.
#[instrument(skip(state, query))]
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Response {
    let Some(cfg) = state.config.google.clone() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Google OAuth not configured" })),
        )
            .into_response();
    };

    let Some(code) = query.code else {
        let url = google::authorize_url(&cfg, &state.config.public_origin);
        return Redirect::temporary(&url).into_response();
    };

    match complete_google_login(&state, &cfg, &code).await {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "google login failed");
            ApiError::ExternalAuthFailure.into_response()
        }
    }
}

async fn complete_google_login(
    state: &AppState,
    cfg: &crate::config::GoogleConfig,
    code: &str,
) -> ApiResult<Response> {
    let identity = google::exchange_code(cfg, &state.config.public_origin, code).await?;
    let user = services::external_login(&state.db, &identity).await?;

    let keys = JwtKeys::from_ref(state);
    let token = keys.issue(user.id, &user.email)?;

    Ok((
        [(SET_COOKIE, session_cookie(state, &token)?)],
        Redirect::temporary("/dashboard"),
    )
        .into_response())
}

fn session_cookie(state: &AppState, token: &str) -> ApiResult<HeaderValue> {
    let keys = JwtKeys::from_ref(state);
    let name = session::cookie_name(state.config.production);
    let cookie =
        session::set_session_cookie(&name, token, keys.ttl.as_secs(), state.config.production);
    Ok(HeaderValue::from_str(&cookie).map_err(anyhow::Error::from)?)
}

/// Best-effort caller address for login bookkeeping.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_forwarded_for_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn client_ip_absent_when_no_headers() {
        assert!(client_ip(&HeaderMap::new()).is_none());
    }
}
