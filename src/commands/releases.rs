use anyhow::{Result, bail};
use chrono::{DateTime, Utc};

use super::Session;
use crate::client::ReleaseKind;
use crate::partials::guess_partial_versions;
use crate::render;
use crate::types::NewRelease;
use crate::version::split_partial_versions;

pub async fn pending(session: &Session) -> Result<()> {
    let releases = session.client.get_pending_releases().await?;
    session.emit(&releases, |releases| {
        if releases.is_empty() {
            return "no pending releases\n".to_string();
        }
        releases
            .iter()
            .map(|r| render::pending_release(&r.name, &r.phases))
            .collect()
    })
}

/// Newest shipped releases across every catalog branch.
pub async fn recent(session: &Session, limit: usize) -> Result<()> {
    let pairs = session.catalog.product_branches();
    let releases = session.client.get_recent_releases(&pairs, limit).await?;
    session.emit(&releases, |releases| {
        releases
            .iter()
            .map(|r| format!("{}\n", render::release_line(r)))
            .collect()
    })
}

pub async fn shipped(
    session: &Session,
    product: &str,
    branch: &str,
    version: Option<&str>,
    build_number: Option<u32>,
) -> Result<()> {
    let releases = session
        .client
        .get_shipped_releases(product, branch, version, build_number)
        .await?;
    session.emit(&releases, |releases| {
        releases
            .iter()
            .map(|r| format!("{}\n", render::release_line(r)))
            .collect()
    })
}

pub async fn build_numbers(
    session: &Session,
    product: &str,
    branch: &str,
    version: &str,
) -> Result<()> {
    let numbers = session
        .client
        .get_build_numbers(product, branch, version)
        .await?;
    session.emit(&numbers, |numbers| {
        let list: Vec<String> = numbers.iter().map(u32::to_string).collect();
        format!("{}\n", list.join(" "))
    })
}

pub async fn next_build(session: &Session, product: &str, branch: &str, version: &str) -> Result<()> {
    let next = session
        .client
        .guess_build_number(product, branch, version)
        .await?;
    session.emit(&next, |n| format!("{n}\n"))
}

pub async fn partials(session: &Session, product: &str, branch: &str, version: &str) -> Result<()> {
    let (p, b) = session.branch(product, branch)?;
    let suggested = guess_partial_versions(&session.client, p, b, version).await?;
    session.emit(&suggested, |s| format!("{}\n", s.join(",")))
}

/// Arguments of `shipit releases submit`.
#[derive(Debug, Clone, Default)]
pub struct SubmitArgs {
    pub product: String,
    pub branch: String,
    pub revision: String,
    pub version: String,
    pub build_number: Option<u32>,
    pub partials: Option<String>,
    pub guess_partials: bool,
    pub release_eta: Option<DateTime<Utc>>,
}

pub async fn submit(session: &Session, args: SubmitArgs) -> Result<()> {
    let (product, branch) = session.branch(&args.product, &args.branch)?;

    if args.release_eta.is_some() && !branch.enable_release_eta {
        bail!(
            "{} {} does not take a release ETA",
            product.product,
            branch.branch
        );
    }
    if !product.enable_partials && (args.partials.is_some() || args.guess_partials) {
        bail!("{} does not use partial updates", product.product);
    }

    let build_number = match args.build_number {
        Some(n) => n,
        None => {
            session
                .client
                .guess_build_number(&product.product, &branch.branch, &args.version)
                .await?
        }
    };

    let partial_versions = match (&args.partials, args.guess_partials) {
        (Some(list), _) => split_partial_versions(list),
        (None, true) => {
            guess_partial_versions(&session.client, product, branch, &args.version).await?
        }
        (None, false) => Vec::new(),
    };

    let release = session
        .client
        .submit_release(
            product,
            branch,
            &NewRelease {
                revision: args.revision,
                version: args.version,
                build_number,
                release_eta: args.release_eta,
                partial_versions,
            },
        )
        .await?;

    session.emit(&release, |r| format!("created {}\n", r.name))
}

pub async fn cancel(session: &Session, kind: ReleaseKind, name: &str) -> Result<()> {
    let response = session.client.cancel_release(kind, name).await?;
    session.emit(&response, |_| format!("cancelled {name}\n"))
}
