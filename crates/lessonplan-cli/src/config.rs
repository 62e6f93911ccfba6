//! Configuration file management for lessonplan.
//!
//! Provides a TOML-based config file at `~/.config/lessonplan/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lessonplan_core::completion::GeminiConfig;
use lessonplan_db::config::DbConfig;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GEMINI_MODEL";
pub const OWNER_ENV: &str = "LESSONPLAN_OWNER_ID";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub gemini: GeminiSection,
    pub owner: OwnerSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeminiSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OwnerSection {
    /// Owner of every plan and history row this installation writes.
    pub id: Uuid,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the lessonplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/lessonplan` or
/// `~/.config/lessonplan`, never the macOS `Application Support` dir.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("lessonplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("lessonplan")
}

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
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// The file holds an API key, so it is made owner-only on Unix.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
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

    Ok(path)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct AppConfig {
    pub db_config: DbConfig,
    pub owner_id: Option<Uuid>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl AppConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `LESSONPLAN_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Owner: `cli_owner` > `LESSONPLAN_OWNER_ID` > `owner.id` > unset
    /// - API key: `GEMINI_API_KEY` > `gemini.api_key` > unset
    /// - Model: `GEMINI_MODEL` > `gemini.model` > `GeminiConfig::DEFAULT_MODEL`
    pub fn resolve(cli_db_url: Option<&str>, cli_owner: Option<Uuid>) -> Result<Self> {
        Self::resolve_with(load_config().ok(), cli_db_url, cli_owner)
    }

    fn resolve_with(
        file_config: Option<ConfigFile>,
        cli_db_url: Option<&str>,
        cli_owner: Option<Uuid>,
    ) -> Result<Self> {
        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let owner_id = if let Some(owner) = cli_owner {
            Some(owner)
        } else if let Ok(raw) = std::env::var(OWNER_ENV) {
            let owner = raw
                .trim()
                .parse::<Uuid>()
                .with_context(|| format!("{OWNER_ENV} is not a valid UUID: {raw:?}"))?;
            Some(owner)
        } else {
            file_config.as_ref().map(|cfg| cfg.owner.id)
        };

        let gemini = file_config.map(|cfg| cfg.gemini).unwrap_or_default();
        let gemini_api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or(gemini.api_key);
        let gemini_model = std::env::var(MODEL_ENV)
            .ok()
            .filter(|model| !model.trim().is_empty())
            .or(gemini.model)
            .unwrap_or_else(|| GeminiConfig::DEFAULT_MODEL.to_string());

        Ok(Self {
            db_config: DbConfig::new(db_url),
            owner_id,
            gemini_api_key,
            gemini_model,
        })
    }

    /// The owner id, or an error telling the operator how to set one.
    pub fn require_owner(&self) -> Result<Uuid> {
        match self.owner_id {
            Some(owner) => Ok(owner),
            None => bail!(
                "owner id not found; pass --owner, set {OWNER_ENV}, or run `lessonplan init`"
            ),
        }
    }

    /// Provider settings, or an error when no API key is configured.
    pub fn gemini_config(&self) -> Result<GeminiConfig> {
        match &self.gemini_api_key {
            Some(key) => Ok(GeminiConfig::new(key.clone()).with_model(self.gemini_model.clone())),
            None => bail!(
                "Gemini API key not found; set {API_KEY_ENV} or run `lessonplan init --gemini-api-key <KEY>`"
            ),
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_util::{EnvGuard, lock_env};

    fn file_config() -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "postgresql://file:5432/filedb".to_string(),
            },
            gemini: GeminiSection {
                api_key: Some("file-key".to_string()),
                model: Some("file-model".to_string()),
            },
            owner: OwnerSection { id: Uuid::nil() },
        }
    }

    fn clear_env(guard: &mut EnvGuard) {
        for var in [DbConfig::ENV_VAR, OWNER_ENV, API_KEY_ENV, MODEL_ENV] {
            guard.remove(var);
        }
    }

    #[test]
    fn config_file_roundtrip() {
        let original = file_config();
        let text = toml::to_string_pretty(&original).unwrap();
        let loaded: ConfigFile = toml::from_str(&text).unwrap();

        assert_eq!(loaded.database.url, original.database.url);
        assert_eq!(loaded.gemini.api_key.as_deref(), Some("file-key"));
        assert_eq!(loaded.owner.id, Uuid::nil());
    }

    #[test]
    fn gemini_section_is_optional() {
        let text = format!(
            "[database]\nurl = \"postgresql://x/y\"\n\n[owner]\nid = \"{}\"\n",
            Uuid::nil()
        );
        let loaded: ConfigFile = toml::from_str(&text).unwrap();
        assert!(loaded.gemini.api_key.is_none());
        assert!(loaded.gemini.model.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn save_config_writes_owner_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let mut guard = EnvGuard::default();
        guard.set("XDG_CONFIG_HOME", tmp.path().to_str().unwrap());

        let path = save_config(&file_config()).unwrap();
        assert_eq!(path, tmp.path().join("lessonplan").join("config.toml"));

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);

        let loaded = load_config().unwrap();
        assert_eq!(loaded.database.url, "postgresql://file:5432/filedb");
    }

    #[test]
    fn cli_flags_override_everything() {
        let _lock = lock_env();
        let mut guard = EnvGuard::default();
        clear_env(&mut guard);
        guard.set(DbConfig::ENV_VAR, "postgresql://env:5432/envdb");
        guard.set(OWNER_ENV, "00000000-0000-0000-0000-000000000001");

        let cli_owner = Uuid::new_v4();
        let config = AppConfig::resolve_with(
            Some(file_config()),
            Some("postgresql://cli:5432/clidb"),
            Some(cli_owner),
        )
        .unwrap();

        assert_eq!(config.db_config.database_url, "postgresql://cli:5432/clidb");
        assert_eq!(config.owner_id, Some(cli_owner));
    }

    #[test]
    fn env_overrides_config_file() {
        let _lock = lock_env();
        let mut guard = EnvGuard::default();
        clear_env(&mut guard);
        guard.set(DbConfig::ENV_VAR, "postgresql://env:5432/envdb");
        guard.set(OWNER_ENV, "00000000-0000-0000-0000-000000000001");
        guard.set(API_KEY_ENV, "env-key");
        guard.set(MODEL_ENV, "env-model");

        let config = AppConfig::resolve_with(Some(file_config()), None, None).unwrap();

        assert_eq!(config.db_config.database_url, "postgresql://env:5432/envdb");
        assert_eq!(config.owner_id, Some(Uuid::from_u128(1)));
        assert_eq!(config.gemini_api_key.as_deref(), Some("env-key"));
        assert_eq!(config.gemini_model, "env-model");
    }

    #[test]
    fn config_file_used_when_env_unset() {
        let _lock = lock_env();
        let mut guard = EnvGuard::default();
        clear_env(&mut guard);

        let config = AppConfig::resolve_with(Some(file_config()), None, None).unwrap();

        assert_eq!(config.db_config.database_url, "postgresql://file:5432/filedb");
        assert_eq!(config.owner_id, Some(Uuid::nil()));
        assert_eq!(config.gemini_api_key.as_deref(), Some("file-key"));
        assert_eq!(config.gemini_model, "file-model");
    }

    #[test]
    fn defaults_when_nothing_set() {
        let _lock = lock_env();
        let mut guard = EnvGuard::default();
        clear_env(&mut guard);

        let config = AppConfig::resolve_with(None, None, None).unwrap();

        assert_eq!(config.db_config.database_url, DbConfig::DEFAULT_URL);
        assert_eq!(config.gemini_model, GeminiConfig::DEFAULT_MODEL);
        assert!(config.owner_id.is_none());

        let owner_err = config.require_owner().unwrap_err().to_string();
        assert!(owner_err.contains("owner id not found"), "{owner_err}");
        let key_err = config.gemini_config().unwrap_err().to_string();
        assert!(key_err.contains("API key not found"), "{key_err}");
    }

    #[test]
    fn invalid_owner_env_is_an_error() {
        let _lock = lock_env();
        let mut guard = EnvGuard::default();
        clear_env(&mut guard);
        guard.set(OWNER_ENV, "not-a-uuid");

        let err = AppConfig::resolve_with(None, None, None).unwrap_err();
        assert!(err.to_string().contains(OWNER_ENV), "{err}");
    }

    #[test]
    fn gemini_config_carries_model() {
        let _lock = lock_env();
        let mut guard = EnvGuard::default();
        clear_env(&mut guard);

        let config = AppConfig::resolve_with(Some(file_config()), None, None).unwrap();
        let gemini = config.gemini_config().unwrap();
        assert_eq!(gemini.api_key, "file-key");
        assert_eq!(gemini.model, "file-model");
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let _lock = lock_env();
        let path = config_path();
        assert!(
            path.ends_with("lessonplan/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
