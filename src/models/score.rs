use serde::{Deserialize, Serialize};

/// Stored high score of one user within one ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRecord {
    pub ranking_id: i64,
    pub user_id: i64,
    pub score: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// What a conditional write did to the stored score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted,
    Raised,
    Kept,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreSubmitRequest {
    pub score: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreSubmission {
    #[serde(flatten)]
    pub record: ScoreRecord,
    pub created: bool,
    pub updated: bool,
}

impl ScoreSubmission {
    pub fn new(record: ScoreRecord, outcome: PutOutcome) -> Self {
        ScoreSubmission {
            record,
            created: outcome == PutOutcome::Inserted,
            updated: outcome == PutOutcome::Raised,
        }
    }
}
