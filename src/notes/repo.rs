use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Note record, owned exclusively by one user. Every query is scoped
/// by owner; there is no cross-user access path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Note {
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Note>> {
        sqlx::query_as::<_, Note>(
            r#"
            SELECT id, user_id, title, content, created_at, updated_at
            FROM notes
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        title: &str,
        content: &str,
    ) -> sqlx::Result<Note> {
        sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (user_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, content, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(content)
        .fetch_one(db)
        .await
    }

    /// Delete a note if it belongs to `user_id`. Returns whether a row
    /// was removed; an existing note owned by someone else deletes
    /// nothing.
    pub async fn delete_owned(db: &PgPool, user_id: Uuid, note_id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM notes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(note_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
