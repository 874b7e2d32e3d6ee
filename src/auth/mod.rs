//! Bearer tokens for the private API.
//!
//! Obtaining a token is out of scope; a token issued elsewhere is stored
//! here and attached to every authenticated request.

pub mod storage;

pub use storage::{AuthStorage, StoredToken};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Save a token for `api_url`, replacing any previous one.
///
/// Shared by `shipit token set` and anything that needs to seed a
/// database programmatically.
pub fn save_token(
    db_path: &str,
    api_url: &str,
    token: &str,
    expires_at: Option<DateTime<Utc>>,
) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("refusing to store an empty token");
    }
    let storage = AuthStorage::open(db_path).context("failed to open auth storage")?;
    storage
        .set(api_url, &StoredToken::new(token, expires_at))
        .context("failed to save token")?;
    Ok(())
}

/// Remove the stored token for `api_url`.
pub fn forget_token(db_path: &str, api_url: &str) -> Result<()> {
    let storage = AuthStorage::open(db_path).context("failed to open auth storage")?;
    storage.remove(api_url).context("failed to remove token")?;
    Ok(())
}
