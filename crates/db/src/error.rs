/// Failure to persist a record, split by whether the database was reachable.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No connection could be obtained (database down, login refused, pool
    /// timeout), or it dropped mid-statement.
    #[error("Storage unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// A connection was available but the statement failed.
    #[error("Storage write failed: {0}")]
    Write(#[source] sqlx::Error),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Classify an error raised while running a statement on an acquired
    /// connection. Only a connection lost mid-statement counts as the
    /// database being unavailable.
    pub fn from_statement(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::WorkerCrashed => {
                Self::Unavailable(err)
            }
            other => Self::Write(other),
        }
    }
}
