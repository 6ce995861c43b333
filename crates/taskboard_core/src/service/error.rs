//! Use-case error taxonomy for board services.
//!
//! # Invariants
//! - `NotFound`, `Conflict` and `Unprocessable` carry a client-safe reason.
//! - `Internal` never renders store details; they go to the log and `source()`.

use crate::model::board::FieldError;
use crate::repo::board_repo::{RepoError, RepoResult};
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors returned by board services.
#[derive(Debug)]
pub enum BoardError {
    /// Referenced entity is absent in the expected scope.
    NotFound(String),
    /// Operation is structurally disallowed right now.
    Conflict(String),
    /// Request is semantically malformed.
    Unprocessable(String),
    /// Store or transport failure. The transaction was rolled back.
    Internal {
        context: &'static str,
        source: RepoError,
    },
}

impl BoardError {
    /// Wraps a store failure and records it in the diagnostic log.
    pub fn internal(context: &'static str, source: RepoError) -> Self {
        error!(
            "event=store_failure module=service status=error context={} error={}",
            context, source
        );
        Self::Internal { context, source }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Unprocessable(_) => "unprocessable",
            Self::Internal { .. } => "internal",
        }
    }
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(reason) | Self::Conflict(reason) | Self::Unprocessable(reason) => {
                f.write_str(reason)
            }
            Self::Internal { .. } => f.write_str("internal error"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Internal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FieldError> for BoardError {
    fn from(value: FieldError) -> Self {
        Self::Unprocessable(value.to_string())
    }
}

/// Classifies store results into the board taxonomy.
///
/// Only `RepoError::RowNotFound` is ever promoted to a client-visible kind;
/// everything else becomes `Internal`.
pub(crate) trait RepoResultExt<T> {
    fn or_internal(self, context: &'static str) -> Result<T, BoardError>;
    fn or_not_found(self, context: &'static str, reason: &str) -> Result<T, BoardError>;
    fn or_conflict(self, context: &'static str, reason: &str) -> Result<T, BoardError>;
}

impl<T> RepoResultExt<T> for RepoResult<T> {
    fn or_internal(self, context: &'static str) -> Result<T, BoardError> {
        self.map_err(|err| BoardError::internal(context, err))
    }

    fn or_not_found(self, context: &'static str, reason: &str) -> Result<T, BoardError> {
        self.map_err(|err| match err {
            RepoError::RowNotFound { .. } => BoardError::NotFound(reason.to_string()),
            other => BoardError::internal(context, other),
        })
    }

    fn or_conflict(self, context: &'static str, reason: &str) -> Result<T, BoardError> {
        self.map_err(|err| match err {
            RepoError::RowNotFound { .. } => BoardError::Conflict(reason.to_string()),
            other => BoardError::internal(context, other),
        })
    }
}
