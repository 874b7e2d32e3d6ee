use reqwest::Method;
use tracing::info;

use super::releases::{ANY_BUILD_STATUS, next_build_number};
use super::{Api, ShipitClient};
use crate::error::ShipitResult;
use crate::types::{NewXpiRelease, XpiRelease};

const XPI_RELEASES: &str = "/xpi/releases";

impl ShipitClient {
    pub async fn get_xpi_build_numbers(
        &self,
        xpi_name: &str,
        xpi_version: &str,
    ) -> ShipitResult<Vec<u32>> {
        let url = self.http.url(
            Api::Private,
            XPI_RELEASES,
            &[
                ("xpi_name", Some(xpi_name)),
                ("xpi_version", Some(xpi_version)),
                ("status", Some(ANY_BUILD_STATUS)),
            ],
        )?;
        let releases: Vec<XpiRelease> = self.http.get(url).await?;
        Ok(releases.into_iter().map(|r| r.build_number).collect())
    }

    /// Shipped XPI releases, newest first.
    pub async fn get_shipped_xpi_releases(&self) -> ShipitResult<Vec<XpiRelease>> {
        let url = self
            .http
            .url(Api::Private, XPI_RELEASES, &[("status", Some("shipped"))])?;
        let mut releases: Vec<XpiRelease> = self.http.get(url).await?;
        releases.reverse();
        Ok(releases)
    }

    pub async fn get_recent_xpi_releases(&self, limit: usize) -> ShipitResult<Vec<XpiRelease>> {
        let mut releases = self.get_shipped_xpi_releases().await?;
        releases.truncate(limit);
        Ok(releases)
    }

    pub async fn guess_xpi_build_number(
        &self,
        xpi_name: &str,
        xpi_version: &str,
    ) -> ShipitResult<u32> {
        let numbers = self.get_xpi_build_numbers(xpi_name, xpi_version).await?;
        Ok(next_build_number(&numbers))
    }

    pub async fn submit_xpi_release(&self, release: &NewXpiRelease) -> ShipitResult<XpiRelease> {
        info!(
            xpi_name = %release.xpi_name,
            xpi_version = %release.xpi_version,
            build_number = release.build_number,
            "submitting xpi release"
        );
        let url = self.http.url(Api::Private, XPI_RELEASES, &[])?;
        self.http.send(Method::POST, url, Some(release)).await
    }
}
