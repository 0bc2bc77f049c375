use axum::{response::Html, routing::get, Router};

use crate::state::AppState;

/// Minimal HTML shells. The gate's page policies (auth-only pages,
/// protected pages) need live targets; the real UI lives elsewhere.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login))
        .route("/signup", get(signup))
        .route("/dashboard", get(dashboard))
}

async fn home() -> Html<&'static str> {
    Html("<!doctype html><title>notekeep</title><h1>notekeep</h1><p><a href=\"/login\">Log in</a> or <a href=\"/signup\">sign up</a>.</p>")
}

async fn login() -> Html<&'static str> {
    Html("<!doctype html><title>Log in</title><h1>Log in</h1><form method=\"post\" action=\"/api/auth/login\"><input name=\"email\" type=\"email\"><input name=\"password\" type=\"password\"><button>Log in</button></form>")
}

async fn signup() -> Html<&'static str> {
    Html("<!doctype html><title>Sign up</title><h1>Sign up</h1><form method=\"post\" action=\"/api/auth/register\"><input name=\"email\" type=\"email\"><input name=\"password\" type=\"password\"><button>Sign up</button></form>")
}

async fn dashboard() -> Html<&'static str> {
    Html("<!doctype html><title>Dashboard</title><h1>Your notes</h1><div id=\"notes\"></div>")
}
