use crate::db::Db;
use crate::services::high_score::ScoreUpsertService;
use crate::services::leaderboard::LeaderboardService;
use crate::store::{Directory, ScoreStore};
use std::sync::Arc;

/// Shared by every worker; services get their collaborators here and
/// nowhere else.
pub struct AppState {
    pub db: Arc<Db>,
    pub scores: ScoreUpsertService,
    pub leaderboard: LeaderboardService,
}

impl AppState {
    pub fn new(db: Arc<Db>) -> Self {
        let store: Arc<dyn ScoreStore> = db.clone();
        let directory: Arc<dyn Directory> = db.clone();
        AppState {
            scores: ScoreUpsertService::new(store.clone(), directory.clone()),
            leaderboard: LeaderboardService::new(store, directory),
            db,
        }
    }
}
