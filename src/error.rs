use crate::store::StoreError;
use ntex::http::StatusCode;
use ntex::web::{HttpResponse, WebResponseError};
use std::fmt;

/// Entity a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Game(i64),
    Ranking(i64),
    User(i64),
    Score { ranking_id: i64, user_id: i64 },
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Game(id) => write!(f, "game {}", id),
            Resource::Ranking(id) => write!(f, "ranking {}", id),
            Resource::User(id) => write!(f, "user {}", id),
            Resource::Score {
                ranking_id,
                user_id,
            } => write!(f, "score of user {} in ranking {}", user_id, ranking_id),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Db(rusqlite::Error),
    NotFound(Resource),
    BadRequest(String),
    Conflict(String),
    StoreUnavailable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {}", e),
            AppError::NotFound(resource) => write!(f, "Not found: {}", resource),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl WebResponseError for AppError {
    fn error_response(&self, _: &ntex::web::HttpRequest) -> HttpResponse {
        let (status, message) = match self {
            AppError::Db(e) => {
                tracing::error!(target = "http", error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, format!("{} not found", resource))
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => {
                tracing::warn!(target = "http", reason = %msg, "write conflict surfaced");
                (StatusCode::CONFLICT, "Concurrent update, try again".to_string())
            }
            AppError::StoreUnavailable(msg) => {
                tracing::error!(target = "http", reason = %msg, "score store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable".to_string())
            }
        };
        HttpResponse::build(status).json(&serde_json::json!({ "error": message }))
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Unavailable(e) => AppError::StoreUnavailable(e.to_string()),
        }
    }
}
