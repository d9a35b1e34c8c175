//! Storage seam for the request handler.

use async_trait::async_trait;
use polyblog_db::models::post::CreatePost;
use polyblog_db::repositories::PostRepo;
use polyblog_db::{DbPool, StoreError};

/// Somewhere new posts can be written.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Persist `post` as one atomic write.
    async fn insert(&self, post: &CreatePost) -> Result<(), StoreError>;
}

/// PostgreSQL-backed store sharing the worker's single storage handle.
pub struct PgPostStore {
    pool: DbPool,
}

impl PgPostStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert(&self, post: &CreatePost) -> Result<(), StoreError> {
        PostRepo::create(&self.pool, post).await
    }
}
