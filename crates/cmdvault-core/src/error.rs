use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("{0}")]
    Validation(String),

    #[error("group already exists: {0}")]
    GroupExists(String),

    #[error("group not found: {0}")]
    GroupNotFound(i64),

    #[error("command not found: {0}")]
    CommandNotFound(i64),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl VaultError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True when the underlying storage error is a UNIQUE constraint
    /// violation — the benign race anticipated during bootstrap seeding.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Sqlx(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;
