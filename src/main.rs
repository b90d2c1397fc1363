mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod state;
mod store;
#[cfg(test)]
mod test_support;
mod validation;

use config::Config;
use db::Db;
use ntex::web;
use ntex_cors::Cors;
use state::AppState;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[ntex::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let db = Db::open(&config.database_path, config.busy_timeout_ms)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let state = Arc::new(AppState::new(Arc::new(db)));

    info!(
        target = "server",
        addr = %config.bind_addr(),
        database = %config.database_path,
        "ranking server starting"
    );

    web::HttpServer::new(move || {
        web::App::new()
            .state(state.clone())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type"])
                    .max_age(3600)
                    .finish(),
            )
            .configure(routes)
    })
    .bind(config.bind_addr())?
    .run()
    .await
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        // Directory
        .service(
            web::resource("/users")
                .route(web::get().to(handlers::directory::list_users))
                .route(web::post().to(handlers::directory::create_user)),
        )
        .service(
            web::resource("/games")
                .route(web::get().to(handlers::directory::list_games))
                .route(web::post().to(handlers::directory::create_game)),
        )
        .service(
            web::resource("/rankings")
                .route(web::get().to(handlers::directory::list_rankings))
                .route(web::post().to(handlers::directory::create_ranking)),
        )
        // Scores and leaderboards
        .route(
            "/rankings/{ranking_id}/user_rankings",
            web::get().to(handlers::leaderboard::get_leaderboard),
        )
        .service(
            web::resource("/rankings/{ranking_id}/user_rankings/{user_id}")
                .route(web::put().to(handlers::high_score::submit_score))
                .route(web::get().to(handlers::high_score::get_score)),
        );
}

async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
