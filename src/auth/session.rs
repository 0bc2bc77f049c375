use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "token";

/// Cookie name prefix required by browsers to pair with `Secure`.
/// Applied in production, where the cookie is only served over HTTPS.
pub const SECURE_PREFIX: &str = "__Secure-";

pub fn cookie_name(production: bool) -> String {
    if production {
        format!("{SECURE_PREFIX}{SESSION_COOKIE}")
    } else {
        SESSION_COOKIE.to_string()
    }
}

/// `Set-Cookie` value installing the session token.
pub fn set_session_cookie(name: &str, token: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie =
        format!("{name}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value expiring the session cookie immediately.
/// The token itself stays valid until its expiry elapses; logout only
/// removes the client-held copy.
pub fn clear_session_cookie(name: &str, secure: bool) -> String {
    let mut cookie = format!("{name}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Pull a single cookie value out of the request's `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cookie_name_is_mangled_in_production() {
        assert_eq!(cookie_name(false), "token");
        assert_eq!(cookie_name(true), "__Secure-token");
    }

    #[test]
    fn set_cookie_carries_session_attributes() {
        let cookie = set_session_cookie("token", "abc.def.ghi", 604800, false);
        assert!(cookie.starts_with("token=abc.def.ghi"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn set_cookie_is_secure_in_production() {
        let cookie = set_session_cookie("__Secure-token", "t", 604800, true);
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie("token", false);
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn read_cookie_finds_value_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; token=ey.ab.cd; lang=en"),
        );
        assert_eq!(read_cookie(&headers, "token").as_deref(), Some("ey.ab.cd"));
        assert_eq!(read_cookie(&headers, "lang").as_deref(), Some("en"));
        assert!(read_cookie(&headers, "missing").is_none());
    }
}
