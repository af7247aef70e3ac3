//! Configuration file management for taskplan.
//!
//! Provides a TOML-based config file at `~/.config/taskplan/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use taskplan_core::planner::GeminiConfig;
use taskplan_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    pub gemini: GeminiSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiSection {
    /// API credential for the generative-language endpoint.
    pub api_key: String,
    /// Model name override; defaults to the client's built-in default.
    #[serde(default)]
    pub model: Option<String>,
    /// Base URL override, mainly for testing against a local stub.
    #[serde(default)]
    pub base_url: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the taskplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/taskplan` or `~/.config/taskplan`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("taskplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("taskplan")
}

/// Return the path to the taskplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since it holds the API credential.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolution
// -----------------------------------------------------------------------

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct TaskplanConfig {
    pub db_config: DbConfig,
    pub gemini: GeminiConfig,
}

impl TaskplanConfig {
    /// Resolve the database config only (for commands that never call the
    /// provider). Priority: CLI flag > `TASKPLAN_DATABASE_URL` > config file
    /// > platform default.
    pub fn resolve_db(cli_db_url: Option<&str>) -> DbConfig {
        if let Some(url) = cli_db_url {
            return DbConfig::new(url);
        }
        if let Ok(url) = std::env::var("TASKPLAN_DATABASE_URL") {
            return DbConfig::new(url);
        }
        if let Ok(file) = load_config() {
            return DbConfig::new(file.database.url);
        }
        DbConfig::from_env()
    }

    /// Resolve the full configuration, including the provider credential.
    ///
    /// The credential comes from `GEMINI_API_KEY` or the config file; if
    /// neither yields one, resolution fails with guidance.
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let db_config = Self::resolve_db(cli_db_url);
        let file = load_config().ok();

        let api_key = match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.is_empty() => key,
            _ => match file.as_ref().map(|f| f.gemini.api_key.clone()) {
                Some(key) if !key.is_empty() => key,
                _ => bail!(
                    "no Gemini API key configured\n\
                     Set GEMINI_API_KEY or run `taskplan init --api-key <KEY>`."
                ),
            },
        };

        let mut gemini = GeminiConfig::new(api_key);
        if let Some(model) = file.as_ref().and_then(|f| f.gemini.model.clone()) {
            gemini.model = model;
        }
        if let Some(base_url) = file.as_ref().and_then(|f| f.gemini.base_url.clone()) {
            gemini.base_url = base_url;
        }
        // Env vars take precedence over the file.
        let gemini = gemini.with_env_overrides();

        Ok(Self { db_config, gemini })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serializes tests that touch process environment variables.
    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sample_config() -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "sqlite:///tmp/t.db".to_string(),
            },
            gemini: GeminiSection {
                api_key: "k".to_string(),
                model: None,
                base_url: None,
            },
        }
    }

    /// Point the config dir at `dir` for the duration of `f`, restoring the
    /// previous `XDG_CONFIG_HOME` afterwards even if `f`'s result is an error.
    fn with_config_home<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
        let orig = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", dir) };
        let out = f();
        match orig {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }
        out
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();

        let result = with_config_home(tmp.path(), || {
            save_config(&sample_config())?;
            load_config()
        });

        let loaded = result.expect("save then load should succeed");
        assert_eq!(loaded.database.url, "sqlite:///tmp/t.db");
        assert_eq!(loaded.gemini.api_key, "k");
        assert!(
            tmp.path().join("taskplan").join("config.toml").exists(),
            "config file should land under the overridden config home"
        );
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();

        let result = with_config_home(tmp.path(), || save_config(&sample_config()));
        result.expect("save_config should succeed");

        let meta = std::fs::metadata(tmp.path().join("taskplan").join("config.toml")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn load_config_errors_when_file_absent() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();

        let result = with_config_home(tmp.path(), load_config);
        assert!(result.is_err(), "missing config file should be an error");
    }

    #[test]
    fn cli_flag_wins_for_db_url() {
        let cfg = TaskplanConfig::resolve_db(Some("sqlite:///tmp/flag.db"));
        assert_eq!(cfg.database_url, "sqlite:///tmp/flag.db");
    }

    #[test]
    fn config_file_round_trips_through_toml() {
        let file = ConfigFile {
            database: DatabaseSection {
                url: "sqlite:///tmp/t.db".to_string(),
            },
            gemini: GeminiSection {
                api_key: "k".to_string(),
                model: Some("gemini-2.0-flash".to_string()),
                base_url: None,
            },
        };
        let text = toml::to_string_pretty(&file).unwrap();
        let parsed: ConfigFile = toml::from_str(&text).unwrap();
        assert_eq!(parsed.database.url, "sqlite:///tmp/t.db");
        assert_eq!(parsed.gemini.api_key, "k");
        assert_eq!(parsed.gemini.model.as_deref(), Some("gemini-2.0-flash"));
        assert!(parsed.gemini.base_url.is_none());
    }

    #[test]
    fn gemini_section_overrides_are_optional() {
        let parsed: ConfigFile = toml::from_str(
            "[database]\nurl = \"sqlite:///tmp/t.db\"\n\n[gemini]\napi_key = \"k\"\n",
        )
        .unwrap();
        assert!(parsed.gemini.model.is_none());
        assert!(parsed.gemini.base_url.is_none());
    }
}
