use crate::db::Db;
use crate::error::{AppError, Resource};
use crate::models::directory::*;
use crate::store::sqlite::ranking_from_row;
use crate::validation;
use chrono::Utc;
use rusqlite::params;
use tracing::info;

pub fn create_user(db: &Db, req: CreateUserRequest) -> Result<User, AppError> {
    let name = validation::validate_user_name(&req.name)?;
    let now = Utc::now().to_rfc3339();

    let user = db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO users (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![name, now],
        )?;
        Ok(User {
            id: conn.last_insert_rowid(),
            name,
            created_at: now.clone(),
            updated_at: now,
        })
    })?;

    info!(target = "directory", user_id = user.id, "user created");
    Ok(user)
}

pub fn list_users(db: &Db) -> Result<Vec<User>, AppError> {
    Ok(db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT id, name, created_at, updated_at FROM users ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    })?)
}

pub fn create_game(db: &Db, req: CreateGameRequest) -> Result<Game, AppError> {
    let name = validation::validate_game_name(&req.name)?;
    let now = Utc::now().to_rfc3339();

    let game = db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO games (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![name, now],
        )?;
        Ok(Game {
            id: conn.last_insert_rowid(),
            name,
            created_at: now.clone(),
            updated_at: now,
        })
    })?;

    info!(target = "directory", game_id = game.id, "game created");
    Ok(game)
}

pub fn list_games(db: &Db) -> Result<Vec<Game>, AppError> {
    Ok(db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT id, name, created_at, updated_at FROM games ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Game {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?;

        let mut games = Vec::new();
        for row in rows {
            games.push(row?);
        }
        Ok(games)
    })?)
}

pub fn create_ranking(db: &Db, req: CreateRankingRequest) -> Result<Ranking, AppError> {
    let name = validation::validate_ranking_name(&req.name)?;
    let now = Utc::now().to_rfc3339();
    let game_id = req.game_id;

    let ranking = db.with_conn(|conn| {
        let game_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM games WHERE id = ?1)",
            params![game_id],
            |row| row.get(0),
        )?;
        if !game_exists {
            return Ok(None);
        }

        conn.execute(
            "INSERT INTO rankings (game_id, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![game_id, name, now],
        )?;
        Ok(Some(Ranking {
            id: conn.last_insert_rowid(),
            game_id,
            name,
            created_at: now.clone(),
            updated_at: now,
        }))
    })?;

    let ranking = ranking.ok_or(AppError::NotFound(Resource::Game(game_id)))?;
    info!(target = "directory", ranking_id = ranking.id, game_id, "ranking created");
    Ok(ranking)
}

pub fn list_rankings(db: &Db) -> Result<Vec<Ranking>, AppError> {
    Ok(db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, game_id, name, created_at, updated_at FROM rankings ORDER BY id",
        )?;
        let rows = stmt.query_map([], ranking_from_row)?;

        let mut rankings = Vec::new();
        for row in rows {
            rankings.push(row?);
        }
        Ok(rankings)
    })?)
}
