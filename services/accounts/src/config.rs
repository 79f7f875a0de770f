use serde::Deserialize;

use unitask_core::config::Config;

/// Accounts service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct AccountsConfig {
    /// Postgres (or SQLite) connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 5000). Env var: `ACCOUNTS_PORT`.
    #[serde(default = "default_port")]
    pub accounts_port: u16,
    /// HMAC secret for signing admin access tokens.
    pub jwt_secret: String,
    /// Admin identity seeded at startup when both are set.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Apply pending migrations before serving (default true).
    #[serde(default = "default_true")]
    pub run_migrations: bool,
    /// Upper bound of the connection pool (default 10).
    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,
    /// Comma-separated browser origins allowed by CORS (default `*`).
    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    10
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_owned()]
}

impl Config for AccountsConfig {}

impl AccountsConfig {
    /// Admin credentials, if seeding is configured.
    pub fn admin_seed(&self) -> Option<(&str, &str)> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email.as_str(), password.as_str()))
            }
            _ => None,
        }
    }
}
