use futures::future::try_join_all;
use reqwest::Method;
use tracing::{debug, info};

use super::{Api, ShipitClient};
use crate::error::{ShipitError, ShipitResult};
use crate::partials::generate_partial_updates;
use crate::products::{Branch, Product};
use crate::types::{NewRelease, Release, ReleaseRequest, format_eta};

/// Statuses counted when picking the next build number.
pub(crate) const ANY_BUILD_STATUS: &str = "shipped,aborted,scheduled";

impl ShipitClient {
    /// Build numbers already used for a version, whatever became of them.
    pub async fn get_build_numbers(
        &self,
        product: &str,
        branch: &str,
        version: &str,
    ) -> ShipitResult<Vec<u32>> {
        let url = self.http.url(
            Api::Public,
            "/releases",
            &[
                ("product", Some(product)),
                ("branch", Some(branch)),
                ("version", Some(version)),
                ("status", Some(ANY_BUILD_STATUS)),
            ],
        )?;
        let releases: Vec<Release> = self.http.get(url).await?;
        Ok(releases.into_iter().map(|r| r.build_number).collect())
    }

    /// Shipped releases of a product/branch, newest first.
    pub async fn get_shipped_releases(
        &self,
        product: &str,
        branch: &str,
        version: Option<&str>,
        build_number: Option<u32>,
    ) -> ShipitResult<Vec<Release>> {
        let build_number = build_number.map(|n| n.to_string());
        let url = self.http.url(
            Api::Public,
            "/releases",
            &[
                ("product", Some(product)),
                ("branch", Some(branch)),
                ("version", version),
                ("build_number", build_number.as_deref()),
                ("status", Some("shipped")),
            ],
        )?;
        let mut releases: Vec<Release> = self.http.get(url).await?;
        releases.reverse();
        Ok(releases)
    }

    /// The newest `limit` shipped releases of each pair, concatenated in the
    /// order the pairs were given.
    pub async fn get_recent_releases(
        &self,
        product_branches: &[(String, String)],
        limit: usize,
    ) -> ShipitResult<Vec<Release>> {
        let per_branch = try_join_all(product_branches.iter().map(|(product, branch)| async move {
            let mut releases = self.get_shipped_releases(product, branch, None, None).await?;
            releases.truncate(limit);
            Ok::<_, ShipitError>(releases)
        }))
        .await?;

        Ok(per_branch.into_iter().flatten().collect())
    }

    /// One past the highest build number used so far, or 1.
    pub async fn guess_build_number(
        &self,
        product: &str,
        branch: &str,
        version: &str,
    ) -> ShipitResult<u32> {
        let numbers = self.get_build_numbers(product, branch, version).await?;
        Ok(next_build_number(&numbers))
    }

    /// Create a release. Partial updates are computed when the product
    /// enables them.
    pub async fn submit_release(
        &self,
        product: &Product,
        branch: &Branch,
        release: &NewRelease,
    ) -> ShipitResult<Release> {
        let repo_url = branch.repo.clone().ok_or_else(|| ShipitError::Config {
            message: format!(
                "branch {:?} of {} has no repository",
                branch.branch, product.product
            ),
        })?;

        let partial_updates = if product.enable_partials {
            let updates = generate_partial_updates(
                self,
                product,
                branch,
                &release.version,
                &release.partial_versions,
            )
            .await?;
            debug!(count = updates.len(), "computed partial updates");
            Some(updates)
        } else {
            None
        };

        let body = ReleaseRequest {
            branch: branch.branch.clone(),
            build_number: release.build_number,
            product: product.product.clone(),
            repo_url,
            revision: release.revision.clone(),
            version: release.version.clone(),
            release_eta: release.release_eta.as_ref().map(format_eta),
            partial_updates,
            product_key: branch.product_key.clone(),
        };

        info!(
            product = %body.product,
            branch = %body.branch,
            version = %body.version,
            build_number = body.build_number,
            "submitting release"
        );
        let url = self.http.url(Api::Private, "/releases", &[])?;
        self.http.send(Method::POST, url, Some(&body)).await
    }
}

pub(crate) fn next_build_number(existing: &[u32]) -> u32 {
    existing.iter().max().map_or(1, |max| max.saturating_add(1))
}
