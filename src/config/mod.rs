//! Persistent settings backed by SQLite.
//!
//! Shares a database with [`AuthStorage`](crate::auth::AuthStorage); pass
//! the same path to both. Values given on the command line or through the
//! environment win over stored ones; stored ones win over built-in defaults.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::sync::Mutex;

use crate::client::ClientConfig;
use crate::consts::{
    DEFAULT_API_URL, DEFAULT_PUBLIC_API_URL, DEFAULT_TASKCLUSTER_ROOT_URL, DEFAULT_TREEHERDER_URL,
};
use crate::products::ProductCatalog;

/// Keys `shipit config set` accepts.
pub const KNOWN_KEYS: &[&str] = &[
    "api_url",
    "public_api_url",
    "taskcluster_root_url",
    "treeherder_url",
    "products_file",
];

/// Persistent key-value settings store.
pub struct Settings {
    conn: Mutex<Connection>,
}

impl Settings {
    /// Open or create the settings table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open settings database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create settings table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a value (upsert). Unknown keys are rejected.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        if !KNOWN_KEYS.contains(&key) {
            bail!("unknown setting {key:?}; expected one of {}", KNOWN_KEYS.join(", "));
        }
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    /// Remove a key.
    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }

    /// All stored pairs, sorted by key.
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read settings")
    }
}

/// Values supplied on the command line or via environment variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub public_api_url: Option<String>,
    pub taskcluster_root_url: Option<String>,
    pub treeherder_url: Option<String>,
    pub products_file: Option<PathBuf>,
}

/// Effective configuration after layering overrides, stored values and
/// defaults.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub api_url: String,
    pub public_api_url: String,
    pub taskcluster_root_url: String,
    pub treeherder_url: String,
    pub products_file: Option<PathBuf>,
}

impl Resolved {
    pub fn resolve(settings: &Settings, overrides: Overrides) -> Result<Self> {
        let pick = |given: Option<String>, key: &str, default: &str| -> Result<String> {
            match given {
                Some(v) => Ok(v),
                None => Ok(settings.get(key)?.unwrap_or_else(|| default.to_string())),
            }
        };

        let products_file = match overrides.products_file {
            Some(path) => Some(path),
            None => settings.get("products_file")?.map(PathBuf::from),
        };

        Ok(Self {
            api_url: pick(overrides.api_url, "api_url", DEFAULT_API_URL)?,
            public_api_url: pick(
                overrides.public_api_url,
                "public_api_url",
                DEFAULT_PUBLIC_API_URL,
            )?,
            taskcluster_root_url: pick(
                overrides.taskcluster_root_url,
                "taskcluster_root_url",
                DEFAULT_TASKCLUSTER_ROOT_URL,
            )?,
            treeherder_url: pick(
                overrides.treeherder_url,
                "treeherder_url",
                DEFAULT_TREEHERDER_URL,
            )?,
            products_file,
        })
    }

    pub fn client_config(&self, token: Option<String>) -> ClientConfig {
        let config = ClientConfig::default()
            .with_api_url(&self.api_url)
            .with_public_api_url(&self.public_api_url)
            .with_taskcluster_root_url(&self.taskcluster_root_url);
        match token {
            Some(token) => config.with_token(token),
            None => config,
        }
    }

    /// The configured product catalog, or the built-in one.
    pub fn catalog(&self) -> Result<ProductCatalog> {
        match &self.products_file {
            Some(path) => ProductCatalog::load_from_file(path),
            None => Ok(ProductCatalog::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_settings() -> Settings {
        Settings::open(":memory:").unwrap()
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let settings = mem_settings();
        assert!(settings.get("api_url").unwrap().is_none());
    }

    #[test]
    fn set_overwrites_existing() {
        let settings = mem_settings();
        settings.set("api_url", "https://old").unwrap();
        settings.set("api_url", "https://new").unwrap();
        assert_eq!(settings.get("api_url").unwrap().unwrap(), "https://new");
    }

    #[test]
    fn set_rejects_unknown_keys() {
        let settings = mem_settings();
        let err = settings.set("colour", "blue").unwrap_err();
        assert!(err.to_string().contains("unknown setting"));
    }

    #[test]
    fn remove_nonexistent_is_ok() {
        let settings = mem_settings();
        settings.remove("api_url").unwrap();
    }

    #[test]
    fn list_is_sorted() {
        let settings = mem_settings();
        settings.set("treeherder_url", "t").unwrap();
        settings.set("api_url", "a").unwrap();
        assert_eq!(
            settings.list().unwrap(),
            vec![
                ("api_url".to_string(), "a".to_string()),
                ("treeherder_url".to_string(), "t".to_string()),
            ]
        );
    }

    #[test]
    fn resolve_layers_overrides_stored_and_defaults() {
        let settings = mem_settings();
        settings.set("api_url", "https://stored").unwrap();
        settings.set("public_api_url", "https://stored-public").unwrap();

        let resolved = Resolved::resolve(
            &settings,
            Overrides {
                public_api_url: Some("https://flag".to_string()),
                ..Overrides::default()
            },
        )
        .unwrap();

        assert_eq!(resolved.api_url, "https://stored");
        assert_eq!(resolved.public_api_url, "https://flag");
        assert_eq!(resolved.taskcluster_root_url, DEFAULT_TASKCLUSTER_ROOT_URL);
        assert!(resolved.products_file.is_none());
    }

    #[test]
    fn catalog_defaults_to_builtin() {
        let resolved = Resolved::resolve(&mem_settings(), Overrides::default()).unwrap();
        assert!(resolved.catalog().unwrap().product("firefox").is_some());
    }

    #[test]
    fn client_config_carries_token() {
        let resolved = Resolved::resolve(&mem_settings(), Overrides::default()).unwrap();
        assert_eq!(
            resolved.client_config(Some("t".into())).token.as_deref(),
            Some("t")
        );
        assert!(resolved.client_config(None).token.is_none());
    }

    #[test]
    fn persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings-test.db");
        let path_str = path.to_str().unwrap();

        {
            let settings = Settings::open(path_str).unwrap();
            settings.set("api_url", "https://persisted").unwrap();
        }

        {
            let settings = Settings::open(path_str).unwrap();
            assert_eq!(settings.get("api_url").unwrap().unwrap(), "https://persisted");
        }
    }
}
