//! Environment-sourced configuration.
//!
//! All options have defaults suitable for local use; in containers each is
//! overridden via environment variables.

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string, e.g. `sqlite:cmdvault.db`.
    pub database_url: String,
    /// Session-signing key. `None` means "generate a random key per process",
    /// which invalidates sessions across restarts.
    pub secret_key: Option<String>,
    /// Username for the admin account created on first run.
    pub admin_user: String,
    /// Password for the admin account. `None` means "generate a random
    /// password and log it once".
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:cmdvault.db".to_string()),
            secret_key: std::env::var("SECRET_KEY").ok().filter(|s| !s.is_empty()),
            admin_user: std::env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:cmdvault.db".to_string(),
            secret_key: None,
            admin_user: "admin".to_string(),
            admin_password: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_local_file() {
        let cfg = Config::default();
        assert_eq!(cfg.database_url, "sqlite:cmdvault.db");
        assert_eq!(cfg.admin_user, "admin");
        assert!(cfg.admin_password.is_none());
        assert!(cfg.secret_key.is_none());
    }
}
