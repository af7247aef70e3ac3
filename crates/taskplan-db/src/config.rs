use std::env;
use std::path::PathBuf;

/// Database configuration.
///
/// Reads from the `TASKPLAN_DATABASE_URL` environment variable, falling back
/// to a SQLite file under the platform data directory.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full SQLite connection URL (e.g. `sqlite:///home/me/.local/share/taskplan/taskplan.db`).
    pub database_url: String,
}

impl DbConfig {
    /// The default connection URL: a file-backed store in the user's data
    /// directory, or the current directory if no data directory exists.
    pub fn default_url() -> String {
        let dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskplan");
        format!("sqlite://{}", dir.join("taskplan.db").display())
    }

    /// Build a config from the environment.
    ///
    /// Priority: `TASKPLAN_DATABASE_URL` env var, then the platform default.
    pub fn from_env() -> Self {
        let database_url =
            env::var("TASKPLAN_DATABASE_URL").unwrap_or_else(|_| Self::default_url());
        Self { database_url }
    }

    /// Build a config from an explicit URL (useful for tests and CLI flags).
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
