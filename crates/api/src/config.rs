use agency_core::types::DbId;
use agency_workflow::DEFAULT_IDLE_PROJECT_DAYS;

use crate::auth::jwt::{digest_api_key, JwtConfig};

/// Credentials for the API-key authenticated automation surface.
#[derive(Debug, Clone)]
pub struct AutomationConfig {
    /// SHA-256 hex digest of `AUTOMATION_API_KEY`.
    pub key_digest: String,
    /// Admin user the automation surface acts as.
    pub actor_id: DbId,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL and JWT secret have defaults suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound for each post-shutdown drain step (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// `None` disables the automation routes (every call is rejected).
    pub automation: Option<AutomationConfig>,
    /// Idle-project window for the automation surface (default: `7`).
    pub idle_project_days: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `DATABASE_URL`         | required                   |
    /// | `JWT_SECRET`           | required                   |
    /// | `AUTOMATION_API_KEY`   | unset (automation off)     |
    /// | `AUTOMATION_ACTOR_ID`  | required with the key      |
    /// | `IDLE_PROJECT_DAYS`    | `7`                        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt = JwtConfig::from_env();

        let automation = std::env::var("AUTOMATION_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .map(|key| {
                let actor_id: DbId = std::env::var("AUTOMATION_ACTOR_ID")
                    .expect("AUTOMATION_ACTOR_ID must be set when AUTOMATION_API_KEY is")
                    .parse()
                    .expect("AUTOMATION_ACTOR_ID must be a valid i64");
                AutomationConfig {
                    key_digest: digest_api_key(&key),
                    actor_id,
                }
            });

        let idle_project_days: i64 = std::env::var("IDLE_PROJECT_DAYS")
            .unwrap_or_else(|_| DEFAULT_IDLE_PROJECT_DAYS.to_string())
            .parse()
            .expect("IDLE_PROJECT_DAYS must be a valid i64");
        assert!(idle_project_days > 0, "IDLE_PROJECT_DAYS must be positive");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
            jwt,
            automation,
            idle_project_days,
        }
    }
}
