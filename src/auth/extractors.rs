use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::jwt::JwtKeys;
use super::resolver::{self, Identity};
use super::session;
use crate::error::ApiError;
use crate::state::AppState;

/// Extracts the authenticated caller, rejecting with 401 when the
/// request carries no verifiable token in header or cookie.
///
/// The gate already turns anonymous protected-API requests away; this
/// keeps handlers honest even if a route is wired outside the gate.
pub struct CurrentUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let cookie = session::cookie_name(state.config.production);

        resolver::resolve(&parts.headers, &keys, &cookie)
            .map(CurrentUser)
            .ok_or(ApiError::InvalidToken)
    }
}
