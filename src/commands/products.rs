use anyhow::{Result, bail};
use tracing::warn;

use super::Session;
use crate::products::treeherder_url;
use crate::render;

/// Catalog with each branch's enablement state.
pub async fn list(session: &Session) -> Result<()> {
    let disabled = session.client.get_disabled_products().await?;
    let overview = serde_json::json!({
        "products": &session.catalog,
        "disabled": &disabled,
    });
    session.emit(&overview, |_| render::catalog(&session.catalog, &disabled))
}

pub async fn disabled(session: &Session) -> Result<()> {
    let disabled = session.client.get_disabled_products().await?;
    session.emit(&disabled, render::disabled_products)
}

/// Block new releases of a product branch. Only branches the catalog marks
/// as disableable may be toggled.
pub async fn disable(session: &Session, product: &str, branch: &str) -> Result<()> {
    check_disableable(session, product, branch)?;
    let response = session.client.disable_product(product, branch).await?;
    session.emit(&response, |_| format!("disabled {product} {branch}\n"))
}

pub async fn enable(session: &Session, product: &str, branch: &str) -> Result<()> {
    check_disableable(session, product, branch)?;
    let response = session.client.enable_product(product, branch).await?;
    session.emit(&response, |_| format!("enabled {product} {branch}\n"))
}

fn check_disableable(session: &Session, product: &str, branch: &str) -> Result<()> {
    let (_, b) = session.branch(product, branch)?;
    if !b.disableable {
        bail!("{product} {branch} cannot be disabled");
    }
    Ok(())
}

/// Print, and optionally open, the Treeherder page of a push.
pub fn treeherder(session: &Session, project: &str, revision: &str, open: bool) -> Result<()> {
    let url = treeherder_url(&session.settings.treeherder_url, project, revision);
    println!("{url}");
    if open {
        launch(&url, |u| open::that(u));
    }
    Ok(())
}

/// Hand `url` to `opener`. A failed launch is logged, not fatal: the URL has
/// already been printed.
fn launch(url: &str, opener: impl FnOnce(&str) -> std::io::Result<()>) -> bool {
    match opener(url) {
        Ok(()) => true,
        Err(e) => {
            warn!(url, error = %e, "failed to open browser");
            false
        }
    }
}
