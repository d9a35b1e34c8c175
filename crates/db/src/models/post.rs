//! Post entity model and DTOs.

use chrono::NaiveDateTime;
use polyblog_core::form::PostSubmission;
use polyblog_core::types::Timestamp;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `posts` table.
///
/// `created_at` is a `timestamp without time zone` column holding UTC.
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub uuid: String,
    pub created_at: NaiveDateTime,
    pub title: String,
    pub content: String,
}

/// DTO for inserting a new post. Identifier and timestamp are generated
/// here, never taken from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePost {
    pub uuid: Uuid,
    pub created_at: Timestamp,
    pub title: String,
    pub content: String,
}

impl CreatePost {
    /// Stamp a submission with a fresh UUID and the current time.
    pub fn from_submission(submission: PostSubmission) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            title: submission.title,
            content: submission.content,
        }
    }
}
