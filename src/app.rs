use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, gate, notes, pages};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(notes::router())
        .merge(pages::page_routes())
        .route("/api/health", get(|| async { "ok" }))
        .with_state(state.clone())
        // The gate wraps every route; handlers only see admitted requests.
        .layer(middleware::from_fn_with_state(state, gate::gate))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtKeys;
    use axum::body::Body;
    use axum::extract::FromRef;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn authed_request(uri: &str, token: &str, via_cookie: bool) -> Request<Body> {
        let builder = Request::builder().uri(uri);
        let builder = if via_cookie {
            builder.header(header::COOKIE, format!("token={token}"))
        } else {
            builder.header(header::AUTHORIZATION, format!("Bearer {token}"))
        };
        builder.body(Body::empty()).unwrap()
    }

    fn app_with_token() -> (Router, String) {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.issue(Uuid::new_v4(), "alice@example.com").unwrap();
        (build_app(state), token)
    }

    #[tokio::test]
    async fn anonymous_protected_api_is_rejected() {
        let (app, _) = app_with_token();
        let res = app.oneshot(request("/api/notes")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let body = res.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn anonymous_dashboard_redirects_to_login_with_destination() {
        let (app, _) = app_with_token();
        let res = app.oneshot(request("/dashboard")).await.unwrap();
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap(),
            "/login?redirect_to=/dashboard"
        );
    }

    #[tokio::test]
    async fn anonymous_login_page_is_served() {
        let (app, _) = app_with_token();
        let res = app.oneshot(request("/login")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn authenticated_login_page_redirects_home() {
        let (app, token) = app_with_token();
        let res = app
            .oneshot(authed_request("/login", &token, true))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/dashboard");
    }

    #[tokio::test]
    async fn cookie_admits_protected_page() {
        let (app, token) = app_with_token();
        let res = app
            .oneshot(authed_request("/dashboard", &token, true))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bearer_header_admits_protected_page() {
        let (app, token) = app_with_token();
        let res = app
            .oneshot(authed_request("/dashboard", &token, false))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn garbage_token_is_anonymous() {
        let (app, _) = app_with_token();
        let res = app
            .oneshot(authed_request("/api/notes", "garbage", false))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn public_routes_are_open() {
        let (app, _) = app_with_token();
        let res = app.oneshot(request("/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let (app, _) = app_with_token();
        let res = app.oneshot(request("/api/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
