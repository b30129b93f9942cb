use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Entity '{0}' not found in relation model")]
    EntityNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Precondition violation: {0}")]
    PreconditionViolation(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl<T> From<std::sync::PoisonError<T>> for DbError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
