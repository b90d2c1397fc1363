use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub busy_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let database_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "ranking.db".into());
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3001);
        let busy_timeout_ms = env::var("BUSY_TIMEOUT_MS")
            .ok()
            .and_then(|ms| ms.parse().ok())
            .unwrap_or(5000);

        Config {
            database_path,
            host,
            port,
            busy_timeout_ms,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
