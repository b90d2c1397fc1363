use crate::error::AppError;
use crate::models::score::ScoreSubmitRequest;
use crate::state::AppState;
use crate::validation;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn submit_score(
    state: web::types::State<Arc<AppState>>,
    path: web::types::Path<(i64, i64)>,
    body: web::types::Json<ScoreSubmitRequest>,
) -> Result<HttpResponse, AppError> {
    let (ranking_id, user_id) = path.into_inner();
    let score = validation::validate_score(body.score)?;
    let result = state.scores.submit_score(ranking_id, user_id, score)?;
    let mut response = if result.created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(&result))
}

pub async fn get_score(
    state: web::types::State<Arc<AppState>>,
    path: web::types::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (ranking_id, user_id) = path.into_inner();
    let record = state.scores.get_score(ranking_id, user_id)?;
    Ok(HttpResponse::Ok().json(&record))
}
