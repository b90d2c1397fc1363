use crate::error::AppError;
use crate::models::directory::*;
use crate::services::directory as service;
use crate::state::AppState;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn list_users(state: web::types::State<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let users = service::list_users(&state.db)?;
    Ok(HttpResponse::Ok().json(&users))
}

pub async fn create_user(
    state: web::types::State<Arc<AppState>>,
    body: web::types::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user = service::create_user(&state.db, body.into_inner())?;
    Ok(HttpResponse::Created().json(&user))
}

pub async fn list_games(state: web::types::State<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let games = service::list_games(&state.db)?;
    Ok(HttpResponse::Ok().json(&games))
}

pub async fn create_game(
    state: web::types::State<Arc<AppState>>,
    body: web::types::Json<CreateGameRequest>,
) -> Result<HttpResponse, AppError> {
    let game = service::create_game(&state.db, body.into_inner())?;
    Ok(HttpResponse::Created().json(&game))
}

pub async fn list_rankings(
    state: web::types::State<Arc<AppState>>,
) -> Result<HttpResponse, AppError> {
    let rankings = service::list_rankings(&state.db)?;
    Ok(HttpResponse::Ok().json(&rankings))
}

pub async fn create_ranking(
    state: web::types::State<Arc<AppState>>,
    body: web::types::Json<CreateRankingRequest>,
) -> Result<HttpResponse, AppError> {
    let ranking = service::create_ranking(&state.db, body.into_inner())?;
    Ok(HttpResponse::Created().json(&ranking))
}
