//! Unified error handling for tavernd.
//!
//! Expected failures (bad grammar, duplicate keys, missing records) are
//! recovered inside handlers and turned into formatted replies; only
//! unexpected store or delivery failures surface here and abort the
//! single command that hit them.

use crate::chat::NotifyError;
use crate::db::DbError;
use thiserror::Error;

/// Errors that escape a command handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("delivery error: {0}")]
    Notify(#[from] NotifyError),
}

impl HandlerError {
    /// Static error code for log labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Db(_) => "db_error",
            Self::Notify(_) => "notify_error",
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        let err = HandlerError::Db(DbError::NotFound("x".into()));
        assert_eq!(err.error_code(), "db_error");
    }
}
