use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};

use super::Session;
use crate::auth::{self, AuthStorage};
use crate::consts::TOKEN_ENV_VAR;

/// Store a bearer token for the configured API. Reads it from stdin when
/// not given.
pub fn set(session: &Session, token: Option<String>, expires_in_hours: Option<i64>) -> Result<()> {
    let token = match token {
        Some(t) => t,
        None => {
            print!("Paste the access token: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin()
                .read_line(&mut line)
                .context("failed to read token")?;
            line
        }
    };
    if token.trim().is_empty() {
        bail!("no token provided");
    }

    let expires_at = expires_in_hours.map(|h| Utc::now() + Duration::hours(h));
    auth::save_token(
        &session.db_path,
        &session.settings.api_url,
        &token,
        expires_at,
    )?;
    println!("✓ token saved for {}", session.settings.api_url);
    Ok(())
}

pub fn clear(session: &Session) -> Result<()> {
    auth::forget_token(&session.db_path, &session.settings.api_url)?;
    println!("✓ token removed for {}", session.settings.api_url);
    Ok(())
}

/// Where the token for the configured API comes from.
pub fn status(session: &Session) -> Result<()> {
    println!("{}", describe(session)?);
    Ok(())
}

fn describe(session: &Session) -> Result<String> {
    let storage = AuthStorage::open(&session.db_path).context("failed to open auth storage")?;
    let api = &session.settings.api_url;
    let line = match storage.get(api)? {
        Some(stored) if stored.is_expired() => format!("{api}: stored token expired"),
        Some(stored) => match stored.expires_at {
            Some(at) => format!("{api}: stored token ✓ (expires {})", at.to_rfc3339()),
            None => format!("{api}: stored token ✓"),
        },
        None if std::env::var(TOKEN_ENV_VAR).is_ok_and(|t| !t.is_empty()) => {
            format!("{api}: token from {TOKEN_ENV_VAR} ✓")
        }
        None => format!("{api}: not authenticated"),
    };
    Ok(line)
}
