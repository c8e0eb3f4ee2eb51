use std::future::Future;
use std::time::Duration;

use smartnotes_persist::PersistError;
use thiserror::Error;

/// Outcome taxonomy for note operations, as presented to callers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// No session where one is required; the user has to sign in
    #[error("Sign-in required: {0}")]
    Auth(String),

    /// The store rejected or failed the request
    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Request timed out")]
    Timeout,

    #[error("No note is open for editing")]
    NoOpenNote,
}

impl SyncError {
    /// Timeouts are presented exactly like store failures
    pub fn is_remote(&self) -> bool {
        matches!(self, SyncError::Remote(_) | SyncError::Timeout)
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Auth(_))
    }
}

impl From<PersistError> for SyncError {
    fn from(err: PersistError) -> Self {
        match err {
            e if e.is_auth() => SyncError::Auth(e.to_string()),
            PersistError::Timeout => SyncError::Timeout,
            e => SyncError::Remote(e.to_string()),
        }
    }
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Summarization failures. Never escalated into note editing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("Summarization request failed: {0}")]
    Request(String),

    #[error("Summarization timed out after {0:?}")]
    Timeout(Duration),
}

/// Run a store call under `limit`
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> SyncResult<T>
where
    F: Future<Output = Result<T, PersistError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(SyncError::from),
        Err(_) => Err(SyncError::Timeout),
    }
}
