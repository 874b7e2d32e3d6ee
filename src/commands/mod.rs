//! Handlers behind the `shipit` subcommands.
//!
//! Each handler receives a [`Session`] holding the client, the product
//! catalog and the resolved settings, prints its result, and returns.
//! Failures surface as `anyhow` errors; client errors keep their
//! [`ShipitError`](crate::error::ShipitError) inside for exit-code mapping.

pub mod config;
pub mod phase;
pub mod products;
pub mod releases;
pub mod token;
pub mod xpi;

use anyhow::{Result, anyhow};
use serde::Serialize;

use crate::client::ShipitClient;
use crate::config::Resolved;
use crate::products::{Branch, Product, ProductCatalog};

/// Everything a command needs to run.
pub struct Session {
    pub client: ShipitClient,
    pub catalog: ProductCatalog,
    pub settings: Resolved,
    pub db_path: String,
    /// Print JSON instead of text.
    pub json: bool,
}

impl Session {
    /// Look up a product/branch pair in the catalog.
    pub fn branch(&self, product: &str, branch: &str) -> Result<(&Product, &Branch)> {
        let p = self
            .catalog
            .product(product)
            .ok_or_else(|| anyhow!("unknown product {product:?}"))?;
        let b = p
            .branch(branch)
            .ok_or_else(|| anyhow!("unknown branch {branch:?} for {product}"))?;
        Ok((p, b))
    }

    /// Print `value` as JSON in `--json` mode, otherwise the text `human`
    /// renders.
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T) -> String) -> Result<()> {
        print!("{}", self.format(value, human)?);
        Ok(())
    }

    fn format<T: Serialize>(&self, value: &T, human: impl FnOnce(&T) -> String) -> Result<String> {
        if self.json {
            Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
        } else {
            Ok(human(value))
        }
    }
}
