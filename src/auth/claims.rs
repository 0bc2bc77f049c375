use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload carried by the session token.
///
/// The token is self-contained: these four claims plus the signature
/// are the whole session, nothing is stored server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,     // user ID
    pub email: String, // login email at issue time
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
}
