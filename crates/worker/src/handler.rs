//! Per-request business logic: payload in, stored post (or reason) out.

use polyblog_core::error::CoreError;
use polyblog_core::form::parse_submission;
use polyblog_core::reply::Rejection;
use polyblog_core::validation::{validate_submission, PostLimits};
use polyblog_db::models::post::CreatePost;
use polyblog_db::StoreError;
use uuid::Uuid;

use crate::store::PostStore;

/// Why a single request did not produce a post. Never fatal to the worker.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Request(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl HandlerError {
    pub fn rejection(&self) -> Rejection {
        match self {
            Self::Request(CoreError::Validation(_)) => Rejection::Invalid,
            Self::Request(_) => Rejection::Malformed,
            Self::Storage(StoreError::Unavailable(_)) => Rejection::StorageUnavailable,
            Self::Storage(StoreError::Write(_)) => Rejection::StorageFailed,
        }
    }

    /// Description safe to hand back to the client. Storage details stay
    /// in the logs.
    pub fn client_detail(&self) -> String {
        match self {
            Self::Request(e) => e.to_string(),
            Self::Storage(StoreError::Unavailable(_)) => "storage unavailable".to_string(),
            Self::Storage(StoreError::Write(_)) => "could not store post".to_string(),
        }
    }
}

/// Turns one raw request payload into one stored post.
pub struct RequestHandler<S> {
    store: S,
    limits: PostLimits,
}

impl<S: PostStore> RequestHandler<S> {
    pub fn new(store: S, limits: PostLimits) -> Self {
        Self { store, limits }
    }

    /// Parse, validate and store the submission in `payload`.
    ///
    /// Returns the generated UUID of the stored post. Nothing is written
    /// unless every earlier step succeeds.
    pub async fn handle(&self, payload: &[u8]) -> Result<Uuid, HandlerError> {
        let submission = parse_submission(payload)?;
        validate_submission(&submission, &self.limits)?;

        let post = CreatePost::from_submission(submission);
        self.store.insert(&post).await?;
        Ok(post.uuid)
    }
}
