use crate::error::{AppError, Resource};
use crate::models::score::{PutOutcome, ScoreRecord, ScoreSubmission};
use crate::store::{Directory, ScoreStore, StoreError};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Conditional writes attempted per submission before a conflict is surfaced.
pub const MAX_SUBMIT_ATTEMPTS: usize = 3;

/// Keeps the highest score ever submitted per `(ranking, user)`.
#[derive(Clone)]
pub struct ScoreUpsertService {
    store: Arc<dyn ScoreStore>,
    directory: Arc<dyn Directory>,
}

impl ScoreUpsertService {
    pub fn new(store: Arc<dyn ScoreStore>, directory: Arc<dyn Directory>) -> Self {
        ScoreUpsertService { store, directory }
    }

    /// Stores `score` if it beats the current high score.
    ///
    /// The ranking and the user must exist. A submission that does not beat
    /// the stored score leaves the record untouched and returns it as is.
    /// Write conflicts are retried with a fresh read, up to
    /// [`MAX_SUBMIT_ATTEMPTS`] writes in total.
    #[instrument(level = "debug", skip(self))]
    pub fn submit_score(
        &self,
        ranking_id: i64,
        user_id: i64,
        score: i64,
    ) -> Result<ScoreSubmission, AppError> {
        self.ensure_participants(ranking_id, user_id)?;

        let mut attempt = 1;
        loop {
            match self.store.put_score_if_greater(ranking_id, user_id, score) {
                Ok((record, outcome)) => {
                    if outcome != PutOutcome::Kept {
                        info!(
                            target = "scores.submit",
                            ranking_id,
                            user_id,
                            score = record.score,
                            ?outcome,
                            "high score stored"
                        );
                    }
                    return Ok(ScoreSubmission::new(record, outcome));
                }
                Err(StoreError::Conflict(reason)) if attempt < MAX_SUBMIT_ATTEMPTS => {
                    let current = self.store.get_score(ranking_id, user_id)?;
                    debug!(
                        target = "scores.submit",
                        ranking_id,
                        user_id,
                        attempt,
                        current = ?current.as_ref().map(|r| r.score),
                        %reason,
                        "conditional write conflicted"
                    );
                    if let Some(record) = current {
                        if record.score >= score {
                            return Ok(ScoreSubmission::new(record, PutOutcome::Kept));
                        }
                    }
                    attempt += 1;
                }
                Err(StoreError::Conflict(reason)) => {
                    warn!(
                        target = "scores.submit",
                        ranking_id,
                        user_id,
                        attempts = attempt,
                        %reason,
                        "giving up after repeated write conflicts"
                    );
                    return Err(AppError::Conflict(reason));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Current high score of `user_id` in `ranking_id`.
    pub fn get_score(&self, ranking_id: i64, user_id: i64) -> Result<ScoreRecord, AppError> {
        self.ensure_participants(ranking_id, user_id)?;
        self.store
            .get_score(ranking_id, user_id)?
            .ok_or(AppError::NotFound(Resource::Score {
                ranking_id,
                user_id,
            }))
    }

    fn ensure_participants(&self, ranking_id: i64, user_id: i64) -> Result<(), AppError> {
        if !self.directory.ranking_exists(ranking_id)? {
            return Err(AppError::NotFound(Resource::Ranking(ranking_id)));
        }
        if !self.directory.user_exists(user_id)? {
            return Err(AppError::NotFound(Resource::User(user_id)));
        }
        Ok(())
    }
}
