use thiserror::Error;

/// Faults raised by a session store
///
/// These are infrastructure failures, never business rule rejections.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Outcome of a command that did not commit
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("session is full")]
    Full,

    #[error("session already started")]
    AlreadyStarted,

    #[error("already a member of this session")]
    AlreadyMember,

    #[error("not a member of this session")]
    NotAMember,

    #[error("session not started")]
    NotStarted,

    #[error("not your turn")]
    NotYourTurn,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Rejected commands are reported to the caller only; store faults are internal
    pub fn is_rejection(&self) -> bool {
        !matches!(self, SessionError::Store(_))
    }
}
