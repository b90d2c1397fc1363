//! Collaborator interfaces the score services are built on.
//!
//! `Db` implements both traits in [`sqlite`]; tests substitute their own
//! implementations to drive retry and failure paths.

use crate::models::directory::Ranking;
use crate::models::score::{PutOutcome, ScoreRecord};
use rusqlite::{ffi, ErrorCode};
use std::collections::HashMap;
use std::fmt;

pub mod sqlite;

#[derive(Debug)]
pub enum StoreError {
    /// Another writer got in the way; the operation may be retried.
    Conflict(String),
    Unavailable(rusqlite::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict(msg) => write!(f, "write conflict: {}", msg),
            StoreError::Unavailable(e) => write!(f, "store unavailable: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        let retriable = match &e {
            rusqlite::Error::SqliteFailure(err, _) => match err.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => true,
                ErrorCode::ConstraintViolation => matches!(
                    err.extended_code,
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
                ),
                _ => false,
            },
            _ => false,
        };
        if retriable {
            StoreError::Conflict(e.to_string())
        } else {
            StoreError::Unavailable(e)
        }
    }
}

/// Read-only view of rankings and users.
pub trait Directory: Send + Sync {
    fn find_ranking(&self, ranking_id: i64) -> Result<Option<Ranking>, StoreError>;

    fn ranking_exists(&self, ranking_id: i64) -> Result<bool, StoreError> {
        Ok(self.find_ranking(ranking_id)?.is_some())
    }

    fn user_exists(&self, user_id: i64) -> Result<bool, StoreError>;

    /// Display names for `user_ids` in one batched lookup. Unknown ids are
    /// absent from the map.
    fn user_names(&self, user_ids: &[i64]) -> Result<HashMap<i64, String>, StoreError>;
}

/// Keyed storage of `(ranking, user) -> score`.
pub trait ScoreStore: Send + Sync {
    fn get_score(&self, ranking_id: i64, user_id: i64) -> Result<Option<ScoreRecord>, StoreError>;

    /// Atomically stores `score` unless the stored score is already at least
    /// as high. Returns the record as it is after the call.
    fn put_score_if_greater(
        &self,
        ranking_id: i64,
        user_id: i64,
        score: i64,
    ) -> Result<(ScoreRecord, PutOutcome), StoreError>;

    fn list_scores(&self, ranking_id: i64) -> Result<Vec<ScoreRecord>, StoreError>;
}
