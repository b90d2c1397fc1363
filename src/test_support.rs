use crate::db::Db;
use crate::models::directory::{CreateGameRequest, CreateRankingRequest, CreateUserRequest};
use crate::services::directory;

/// Creates a ranking under a fresh game and returns the ranking id.
pub fn seed_ranking(db: &Db, name: &str) -> i64 {
    let game = directory::create_game(
        db,
        CreateGameRequest {
            name: format!("{} game", name),
        },
    )
    .unwrap();
    directory::create_ranking(
        db,
        CreateRankingRequest {
            game_id: game.id,
            name: name.into(),
        },
    )
    .unwrap()
    .id
}

pub fn seed_user(db: &Db, name: &str) -> i64 {
    directory::create_user(db, CreateUserRequest { name: name.into() })
        .unwrap()
        .id
}
