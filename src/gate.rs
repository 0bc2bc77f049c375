use axum::{
    extract::{FromRef, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use crate::auth::{jwt::JwtKeys, resolver, session};
use crate::state::AppState;

/// Admission class of a route, decided purely from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    StaticAsset,
    Public,
    AuthOnly,
    ProtectedPage,
    ProtectedApi,
}

const ASSET_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg", "css", "js", "map", "ico"];

fn is_static_asset(path: &str) -> bool {
    if path.starts_with("/static/") || path.starts_with("/assets/") || path == "/favicon.ico" {
        return true;
    }
    path.rsplit_once('.')
        .map_or(false, |(_, ext)| ASSET_EXTENSIONS.contains(&ext))
}

/// First matching class wins; the order below is load-bearing. The
/// asset exemption runs before everything else so asset requests with
/// an API-looking prefix are never treated as protected API calls.
pub fn classify(path: &str) -> RouteClass {
    if is_static_asset(path) {
        return RouteClass::StaticAsset;
    }
    if path == "/" || path == "/api/health" || path.starts_with("/api/auth/") {
        return RouteClass::Public;
    }
    if path == "/login" || path == "/signup" {
        return RouteClass::AuthOnly;
    }
    if path == "/dashboard"
        || path.starts_with("/dashboard/")
        || path == "/private"
        || path.starts_with("/private/")
    {
        return RouteClass::ProtectedPage;
    }
    if path.starts_with("/api/") {
        return RouteClass::ProtectedApi;
    }
    RouteClass::Public
}

/// What the gate does with a request, given its class and whether the
/// resolver produced an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Forward,
    /// Anonymous caller on a protected page; the intended destination
    /// is preserved so login can send them back.
    RedirectToLogin { destination: String },
    /// Authenticated caller on a login/signup page.
    RedirectHome,
    /// Anonymous caller on a protected API route.
    Unauthorized,
}

pub fn decide(class: RouteClass, authenticated: bool, path: &str) -> Verdict {
    match class {
        RouteClass::StaticAsset | RouteClass::Public => Verdict::Forward,
        RouteClass::AuthOnly if authenticated => Verdict::RedirectHome,
        RouteClass::AuthOnly => Verdict::Forward,
        RouteClass::ProtectedPage if authenticated => Verdict::Forward,
        RouteClass::ProtectedPage => Verdict::RedirectToLogin {
            destination: path.to_string(),
        },
        RouteClass::ProtectedApi if authenticated => Verdict::Forward,
        RouteClass::ProtectedApi => Verdict::Unauthorized,
    }
}

/// Request gate run before every handler. Stateless across requests:
/// the verdict is a pure function of the path, the presented token
/// and process-wide configuration.
pub async fn gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let class = classify(&path);

    let authenticated = match class {
        // No token work where the verdict cannot depend on it.
        RouteClass::StaticAsset | RouteClass::Public => false,
        _ => {
            let keys = JwtKeys::from_ref(&state);
            let cookie = session::cookie_name(state.config.production);
            resolver::resolve(req.headers(), &keys, &cookie).is_some()
        }
    };

    match decide(class, authenticated, &path) {
        Verdict::Forward => next.run(req).await,
        Verdict::RedirectHome => Redirect::temporary("/dashboard").into_response(),
        Verdict::RedirectToLogin { destination } => {
            Redirect::temporary(&format!("/login?redirect_to={destination}")).into_response()
        }
        Verdict::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response(),
    }
}
