use serde::Deserialize;

/// Insecure fallback used when `JWT_SECRET` is unset outside production.
pub const DEV_SECRET: &str = "dev_secret_change_me";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub production: bool,
    pub public_origin: String,
    pub jwt: JwtConfig,
    pub google: Option<GoogleConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let production = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ if production => {
                anyhow::bail!("JWT_SECRET must be set when APP_ENV=production")
            }
            _ => {
                tracing::warn!("JWT_SECRET not set; using insecure development default");
                DEV_SECRET.to_string()
            }
        };

        let jwt = JwtConfig {
            secret,
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };

        // OAuth is optional; both halves must be present to enable it.
        let google = match (
            std::env::var("GOOGLE_CLIENT_ID"),
            std::env::var("GOOGLE_CLIENT_SECRET"),
        ) {
            (Ok(client_id), Ok(client_secret))
                if !client_id.is_empty() && !client_secret.is_empty() =>
            {
                Some(GoogleConfig {
                    client_id,
                    client_secret,
                })
            }
            _ => None,
        };

        let public_origin =
            std::env::var("PUBLIC_ORIGIN").unwrap_or_else(|_| "http://localhost:8080".into());

        Ok(Self {
            database_url,
            production,
            public_origin,
            jwt,
            google,
        })
    }
}
