use reqwest::Method;
use serde_json::Value;
use tracing::info;

use super::{Api, ShipitClient};
use crate::error::ShipitResult;
use crate::types::{DisabledProducts, ProductBranch};

const DISABLED_PRODUCTS: &str = "/disabled-products";

impl ShipitClient {
    /// Product → branches on which new releases are currently blocked.
    pub async fn get_disabled_products(&self) -> ShipitResult<DisabledProducts> {
        let url = self.http.url(Api::Public, DISABLED_PRODUCTS, &[])?;
        let disabled: Option<DisabledProducts> = self.http.get(url).await?;
        Ok(disabled.unwrap_or_default())
    }

    pub async fn disable_product(&self, product: &str, branch: &str) -> ShipitResult<Value> {
        info!(product, branch, "disabling product");
        let url = self.http.url(Api::Private, DISABLED_PRODUCTS, &[])?;
        self.http
            .send(Method::POST, url, Some(&ProductBranch { product, branch }))
            .await
    }

    pub async fn enable_product(&self, product: &str, branch: &str) -> ShipitResult<Value> {
        info!(product, branch, "enabling product");
        let url = self.http.url(
            Api::Private,
            DISABLED_PRODUCTS,
            &[("product", Some(product)), ("branch", Some(branch))],
        )?;
        self.http.send::<(), _>(Method::DELETE, url, None).await
    }
}
