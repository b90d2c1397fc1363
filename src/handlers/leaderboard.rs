use crate::error::AppError;
use crate::models::leaderboard::LeaderboardQuery;
use crate::state::AppState;
use crate::validation;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn get_leaderboard(
    state: web::types::State<Arc<AppState>>,
    path: web::types::Path<i64>,
    query: web::types::Query<LeaderboardQuery>,
) -> Result<HttpResponse, AppError> {
    let ranking_id = path.into_inner();
    let limit = validation::validate_limit(query.limit)?;
    let board = state.leaderboard.get_leaderboard(ranking_id, limit)?;
    Ok(HttpResponse::Ok().json(&board))
}
