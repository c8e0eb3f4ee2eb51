use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    /// An operation needed a session and there is none
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The auth provider rejected credentials or a session call
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Note not found: {0}")]
    NotFound(String),

    /// Non-success response from the remote store
    #[error("Remote store error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersistError {
    /// Errors that should send the user back to sign-in
    pub fn is_auth(&self) -> bool {
        matches!(self, PersistError::NotAuthenticated | PersistError::Auth(_))
    }
}

impl From<reqwest::Error> for PersistError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PersistError::Timeout
        } else if err.is_decode() {
            PersistError::Internal(format!("Malformed response: {}", err))
        } else {
            PersistError::Http(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
