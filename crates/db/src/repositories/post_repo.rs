//! Repository for the `posts` table.

use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::post::{CreatePost, Post};

/// Column list for `posts` queries.
const COLUMNS: &str = "uuid, created_at, title, content";

/// Provides insert and lookup operations for posts.
pub struct PostRepo;

impl PostRepo {
    /// Insert a new post as a single statement.
    ///
    /// Any failure to obtain a connection, including the server rejecting
    /// the login, is [`StoreError::Unavailable`]. Failures of the statement
    /// itself are [`StoreError::Write`].
    pub async fn create(pool: &PgPool, input: &CreatePost) -> Result<(), StoreError> {
        let mut conn = pool.acquire().await.map_err(StoreError::Unavailable)?;

        let query = format!("INSERT INTO posts ({COLUMNS}) VALUES ($1, $2, $3, $4)");
        let result = sqlx::query(&query)
            .bind(input.uuid.to_string())
            .bind(input.created_at.naive_utc())
            .bind(&input.title)
            .bind(&input.content)
            .execute(&mut *conn)
            .await
            .map_err(StoreError::from_statement)?;

        tracing::debug!(
            uuid = %input.uuid,
            rows = result.rows_affected(),
            "Inserted post",
        );
        Ok(())
    }

    /// Find a post by its generated UUID.
    pub async fn find_by_uuid(pool: &PgPool, uuid: &str) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE uuid = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(uuid)
            .fetch_optional(pool)
            .await
    }

    /// Number of stored posts.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
