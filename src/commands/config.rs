use anyhow::{Context, Result};

use super::Session;
use crate::config::{KNOWN_KEYS, Settings};

fn open(session: &Session) -> Result<Settings> {
    Settings::open(&session.db_path).context("failed to open settings")
}

pub fn get(session: &Session, key: &str) -> Result<()> {
    match open(session)?.get(key)? {
        Some(value) => println!("{value}"),
        None => println!("{key} is not set"),
    }
    Ok(())
}

pub fn set(session: &Session, key: &str, value: &str) -> Result<()> {
    open(session)?.set(key, value)?;
    println!("✓ {key} = {value}");
    Ok(())
}

pub fn unset(session: &Session, key: &str) -> Result<()> {
    open(session)?.remove(key)?;
    println!("✓ {key} unset");
    Ok(())
}

/// Stored values, followed by the effective ones.
pub fn list(session: &Session) -> Result<()> {
    let stored = open(session)?.list()?;
    if stored.is_empty() {
        println!("no stored settings (known keys: {})", KNOWN_KEYS.join(", "));
    } else {
        for (key, value) in &stored {
            println!("  {key:<22} {value}");
        }
    }

    let s = &session.settings;
    println!("\neffective:");
    println!("  {:<22} {}", "api_url", s.api_url);
    println!("  {:<22} {}", "public_api_url", s.public_api_url);
    println!("  {:<22} {}", "taskcluster_root_url", s.taskcluster_root_url);
    println!("  {:<22} {}", "treeherder_url", s.treeherder_url);
    if let Some(path) = &s.products_file {
        println!("  {:<22} {}", "products_file", path.display());
    }
    Ok(())
}
