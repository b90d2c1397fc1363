use crate::error::AppError;

const MAX_USER_NAME_LEN: usize = 30;
const MAX_GAME_NAME_LEN: usize = 30;
const MAX_RANKING_NAME_LEN: usize = 50;
const MAX_LEADERBOARD_LIMIT: i64 = 1000;

/// Trims `name` and checks it against `max_len` Unicode scalar values.
fn validate_name(kind: &str, name: &str, max_len: usize) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} name cannot be empty", kind)));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::BadRequest(format!(
            "{} name must be at most {} characters",
            kind, max_len
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_user_name(name: &str) -> Result<String, AppError> {
    validate_name("User", name, MAX_USER_NAME_LEN)
}

pub fn validate_game_name(name: &str) -> Result<String, AppError> {
    validate_name("Game", name, MAX_GAME_NAME_LEN)
}

pub fn validate_ranking_name(name: &str) -> Result<String, AppError> {
    validate_name("Ranking", name, MAX_RANKING_NAME_LEN)
}

/// Absent and zero scores are rejected; anything else goes to the upsert.
pub fn validate_score(score: Option<i64>) -> Result<i64, AppError> {
    match score {
        None | Some(0) => Err(AppError::BadRequest("Score is required".into())),
        Some(score) => Ok(score),
    }
}

pub fn validate_limit(limit: Option<i64>) -> Result<Option<usize>, AppError> {
    match limit {
        None => Ok(None),
        Some(limit) if (1..=MAX_LEADERBOARD_LIMIT).contains(&limit) => Ok(Some(limit as usize)),
        Some(_) => Err(AppError::BadRequest(format!(
            "Limit must be 1-{}",
            MAX_LEADERBOARD_LIMIT
        ))),
    }
}
