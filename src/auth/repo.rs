use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
///
/// The credential columns are both nullable; the table CHECK
/// constraint guarantees at least one is set, so every user has some
/// way to authenticate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing)]
    pub google_id: Option<String>,
    pub created_at: OffsetDateTime,
    pub last_login_at: Option<OffsetDateTime>,
    pub last_login_ip: Option<String>,
    pub login_count: i32,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, google_id, created_at,
                   last_login_at, last_login_ip, login_count
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_google_id(db: &PgPool, google_id: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, google_id, created_at,
                   last_login_at, last_login_ip, login_count
            FROM users
            WHERE google_id = $1
            "#,
        )
        .bind(google_id)
        .fetch_optional(db)
        .await
    }

    /// Create a locally-registered user. The unique index on email is
    /// what decides concurrent registrations; callers map its
    /// violation to a duplicate-email failure.
    pub async fn create_local(db: &PgPool, email: &str, password_hash: &str) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, google_id, created_at,
                      last_login_at, last_login_ip, login_count
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    /// Create a user known only through an external identity provider.
    pub async fn create_external(db: &PgPool, email: &str, google_id: &str) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, google_id)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, google_id, created_at,
                      last_login_at, last_login_ip, login_count
            "#,
        )
        .bind(email)
        .bind(google_id)
        .fetch_one(db)
        .await
    }

    /// Attach an external identity to an existing local account.
    pub async fn link_google(db: &PgPool, id: Uuid, google_id: &str) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET google_id = $2
            WHERE id = $1
            RETURNING id, email, password_hash, google_id, created_at,
                      last_login_at, last_login_ip, login_count
            "#,
        )
        .bind(id)
        .bind(google_id)
        .fetch_one(db)
        .await
    }

    /// Advisory login bookkeeping; not security-relevant.
    pub async fn record_login(db: &PgPool, id: Uuid, ip: Option<&str>) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = now(),
                login_count = login_count + 1,
                last_login_ip = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(ip)
        .execute(db)
        .await?;
        Ok(())
    }
}
