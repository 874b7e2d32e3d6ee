use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::warn;

/// A bearer token saved for one API deployment.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoredToken {
    pub token: String,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            saved_at: Utc::now(),
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }
}

/// Manages token storage in SQLite, keyed by API URL.
///
/// Shares a database with [`Settings`](crate::config::Settings); pass the
/// same path to both.
pub struct AuthStorage {
    conn: Mutex<Connection>,
}

impl AuthStorage {
    /// Open or create the credentials table in the given database path.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open credentials database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS credentials (
                api_url TEXT PRIMARY KEY,
                data    TEXT NOT NULL
            )",
        )
        .context("failed to create credentials table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the token stored for an API.
    pub fn get(&self, api_url: &str) -> Result<Option<StoredToken>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT data FROM credentials WHERE api_url = ?1")?;
        let mut rows = stmt.query([api_url])?;
        match rows.next()? {
            Some(row) => {
                let json: String = row.get(0)?;
                let token: StoredToken = serde_json::from_str(&json)?;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    /// Store the token for an API (upsert).
    pub fn set(&self, api_url: &str, token: &StoredToken) -> Result<()> {
        let json = serde_json::to_string(token)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO credentials (api_url, data) VALUES (?1, ?2)
             ON CONFLICT(api_url) DO UPDATE SET data = excluded.data",
            [api_url, &json],
        )?;
        Ok(())
    }

    /// Remove the token for an API.
    pub fn remove(&self, api_url: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM credentials WHERE api_url = ?1", [api_url])?;
        Ok(())
    }

    /// Token to send to `api_url`.
    /// Priority: stored unexpired token → environment variable.
    pub fn resolve(&self, api_url: &str, env_var: &str) -> Result<Option<String>> {
        if let Some(stored) = self.get(api_url)? {
            if !stored.is_expired() {
                return Ok(Some(stored.token));
            }
            warn!(api_url, "stored token has expired");
        }

        if let Ok(token) = std::env::var(env_var)
            && !token.is_empty()
        {
            return Ok(Some(token));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry() {
        assert!(!StoredToken::new("t", None).is_expired());
        assert!(!StoredToken::new("t", Some(Utc::now() + Duration::hours(1))).is_expired());
        assert!(StoredToken::new("t", Some(Utc::now() - Duration::seconds(1))).is_expired());
    }

    #[test]
    fn tokens_are_per_api() {
        let storage = AuthStorage::open(":memory:").unwrap();
        storage
            .set("https://a.example.com", &StoredToken::new("ta", None))
            .unwrap();
        storage
            .set("https://b.example.com", &StoredToken::new("tb", None))
            .unwrap();

        assert_eq!(storage.get("https://a.example.com").unwrap().unwrap().token, "ta");
        assert_eq!(storage.get("https://b.example.com").unwrap().unwrap().token, "tb");
    }
}
