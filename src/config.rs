use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Shared secret for the trusted dashboard session. Requests carrying it
    /// in `X-Admin-Session` resolve to the `super_admin` role.
    pub admin_session_token: Option<String>,
    pub token_ttl_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let admin_session_token = env::var("ADMIN_SESSION_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .unwrap_or(24);
        Ok(Self {
            database_url,
            host,
            port,
            admin_session_token,
            token_ttl_hours,
        })
    }
}
