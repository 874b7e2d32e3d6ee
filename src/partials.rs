//! Partial-update rules.
//!
//! A partial lets users on an older shipped build update to the new release
//! with a delta. Each one is identified by a `<version>build<n>` id and
//! carries the locales that older build shipped.

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::client::ShipitClient;
use crate::consts::DEFAULT_NUMBER_OF_PARTIALS;
use crate::error::{ShipitError, ShipitResult};
use crate::products::{Branch, Product};
use crate::types::{PartialUpdate, PartialUpdates};
use crate::version::{BuildId, is_rc};

/// Resolve every `<version>build<n>` entry to its shipped release and
/// locales. Blank entries are skipped; lookups run in parallel.
pub async fn generate_partial_updates(
    client: &ShipitClient,
    product: &Product,
    branch: &Branch,
    version: &str,
    partial_versions: &[String],
) -> ShipitResult<PartialUpdates> {
    let ids = partial_versions
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(BuildId::parse)
        .collect::<ShipitResult<Vec<_>>>()?;

    let rc = is_rc(version);
    let entries = try_join_all(
        ids.into_iter()
            .map(|id| resolve_partial(client, product, branch, rc, id)),
    )
    .await?;

    Ok(entries.into_iter().collect())
}

async fn resolve_partial(
    client: &ShipitClient,
    product: &Product,
    branch: &Branch,
    rc: bool,
    id: BuildId,
) -> ShipitResult<(String, PartialUpdate)> {
    let mut lookup_branch = branch.branch.as_str();
    let mut lookup_repo = branch.repo.as_deref();

    // RC partials from the beta cycle shipped on the RC branch.
    if rc
        && branch.rc_matches(&id.version)
        && let Some(rc_branch) = branch.rc_branch.as_deref()
    {
        lookup_branch = rc_branch;
        lookup_repo = branch.rc_repo.as_deref();
    }

    let mut shipped = client
        .get_shipped_releases(
            &product.product,
            lookup_branch,
            Some(&id.version),
            Some(id.build_number),
        )
        .await?;

    if shipped.is_empty()
        && let Some(alternative) = branch.alternative_branch.as_deref()
    {
        debug!(
            partial = %id,
            branch = lookup_branch,
            alternative,
            "partial not found, trying alternative branch"
        );
        lookup_branch = alternative;
        lookup_repo = branch.alternative_repo.as_deref();
        shipped = client
            .get_shipped_releases(
                &product.product,
                lookup_branch,
                Some(&id.version),
                Some(id.build_number),
            )
            .await?;
    }

    if shipped.len() != 1 {
        return Err(ShipitError::PartialLookup {
            product: product.product.clone(),
            branch: lookup_branch.to_string(),
            version: id.version,
            build_number: id.build_number,
        });
    }

    let repo = lookup_repo.ok_or_else(|| ShipitError::Config {
        message: format!("no repository configured for {} {lookup_branch}", product.product),
    })?;
    let locales = client
        .locale_source()
        .get_locales(repo, &shipped[0].revision, &product.app_name)
        .await?;

    Ok((
        id.version,
        PartialUpdate {
            build_number: id.build_number,
            locales,
        },
    ))
}

/// Suggest partials for a new release: the newest shipped builds of the
/// branch, topped up from the alternative branch, plus the last build of the
/// RC branch when releasing an RC.
pub async fn guess_partial_versions(
    client: &ShipitClient,
    product: &Product,
    branch: &Branch,
    version: &str,
) -> ShipitResult<Vec<String>> {
    let wanted = branch
        .number_of_partials
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_NUMBER_OF_PARTIALS);

    let shipped = client
        .get_shipped_releases(&product.product, &branch.branch, None, None)
        .await?;
    let suggested: Vec<String> = shipped
        .iter()
        .take(wanted)
        .map(|r| r.build_id().to_string())
        .collect();

    let mut alternative_builds = Vec::new();
    if suggested.len() < wanted
        && let Some(alternative) = branch.alternative_branch.as_deref()
    {
        let alternative_releases = client
            .get_shipped_releases(&product.product, alternative, None, None)
            .await?;
        alternative_builds = alternative_releases
            .iter()
            .take(wanted - suggested.len())
            .map(|r| r.build_id().to_string())
            .collect();
    }

    let mut rc_builds = Vec::new();
    if let Some(rc_branch) = branch.rc_branch.as_deref()
        && is_rc(version)
    {
        let rc_releases = client
            .get_shipped_releases(&product.product, rc_branch, None, None)
            .await?;
        match rc_releases.first() {
            Some(last) => rc_builds.push(last.build_id().to_string()),
            None => warn!(
                product = %product.product,
                rc_branch,
                "no shipped release on RC branch to suggest"
            ),
        }
    }

    Ok(suggested
        .into_iter()
        .chain(rc_builds)
        .chain(alternative_builds)
        .collect())
}
