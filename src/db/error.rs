use sqlx::error::DatabaseError;
use thiserror::Error;

/// Failure classes surfaced by the operation layer.
///
/// `Integrity` and `Unavailable` are the two kinds callers are expected to
/// report distinctly; everything else lands in `Database`.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database unreachable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("integrity violation: {0}")]
    Integrity(#[source] sqlx::Error),

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

// SQLSTATE class 23 covers constraint breaches: 23505 unique_violation,
// 23503 foreign_key_violation, 23502 not_null_violation.
fn is_constraint_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().is_some_and(|code| code.starts_with("23"))
        }
        _ => false,
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if is_constraint_violation(&err) {
            return DbError::Integrity(err);
        }
        match err {
            e @ (sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed) => DbError::Unavailable(e),
            e => DbError::Database(e),
        }
    }
}
