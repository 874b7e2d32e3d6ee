//! Catalog of products and branches the console can release.
//!
//! Field names are camelCase on the wire so a JSON catalog file can be
//! shared with the web console's configuration.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Regex matched against partial versions to decide whether they ship
/// from the RC branch.
#[derive(Debug, Clone)]
pub struct VersionPattern(Regex);

impl VersionPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    pub fn is_match(&self, version: &str) -> bool {
        self.0.is_match(version)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Serialize for VersionPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VersionPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        Self::new(&pattern).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Branch {
    pub pretty_name: Option<String>,
    pub project: Option<String>,
    pub branch: String,
    pub repo: Option<String>,
    pub rc_branch: Option<String>,
    pub rc_repo: Option<String>,
    pub rc_branch_version_pattern: Option<VersionPattern>,
    pub alternative_branch: Option<String>,
    pub alternative_repo: Option<String>,
    pub number_of_partials: Option<usize>,
    pub product_key: Option<String>,
    pub enable_release_eta: bool,
    pub disableable: bool,
}

impl Branch {
    /// Whether a partial of `partial_version` should be looked up on the RC
    /// branch instead of this one.
    pub fn rc_matches(&self, partial_version: &str) -> bool {
        self.rc_branch.is_some()
            && self
                .rc_branch_version_pattern
                .as_ref()
                .is_some_and(|p| p.is_match(partial_version))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    #[serde(default)]
    pub pretty_name: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    pub repo: String,
    #[serde(default)]
    pub enable_release_eta: bool,
    #[serde(default = "default_true")]
    pub enable_treeherder: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub product: String,
    pub pretty_name: String,
    pub app_name: String,
    pub branches: Vec<Branch>,
    pub repositories: Vec<Repository>,
    pub enable_partials: bool,
    pub can_toggle_partials: bool,
}

impl Product {
    pub fn branch(&self, branch: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.branch == branch)
    }
}

/// Repository holding the XPI build manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpiManifest {
    pub branch: String,
    pub owner: String,
    pub project: String,
    pub repo: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductCatalog {
    pub products: Vec<Product>,
    pub xpi_manifest: Option<XpiManifest>,
}

impl ProductCatalog {
    /// The catalog of the staging deployment.
    pub fn builtin() -> Self {
        let try_branch = |branch: &str, disableable: bool| Branch {
            pretty_name: Some("Try".to_string()),
            project: Some(branch.to_string()),
            branch: branch.to_string(),
            repo: Some(format!("https://hg.mozilla.org/{branch}")),
            enable_release_eta: false,
            disableable,
            ..Branch::default()
        };
        let gecko = |product: &str, pretty: &str, app: &str, branch: Branch| Product {
            product: product.to_string(),
            pretty_name: pretty.to_string(),
            app_name: app.to_string(),
            branches: vec![branch],
            repositories: Vec::new(),
            enable_partials: true,
            can_toggle_partials: true,
        };
        let github = |product: &str, pretty: &str, repo: Repository| Product {
            product: product.to_string(),
            pretty_name: pretty.to_string(),
            app_name: product.to_string(),
            branches: vec![Branch::default()],
            repositories: vec![repo],
            enable_partials: false,
            can_toggle_partials: false,
        };

        Self {
            products: vec![
                gecko("firefox", "Firefox Desktop", "browser", try_branch("try", true)),
                gecko(
                    "devedition",
                    "Firefox Developer Edition",
                    "browser",
                    try_branch("try", true),
                ),
                gecko(
                    "thunderbird",
                    "Thunderbird",
                    "mail",
                    try_branch("try-comm-central", false),
                ),
                github(
                    "firefox-android",
                    "Firefox Android (Android-Components, Fenix, Focus)",
                    Repository {
                        pretty_name: Some("Staging Android monorepo".to_string()),
                        project: Some("staging-firefox-android".to_string()),
                        repo: "https://github.com/mozilla-releng/staging-firefox-android"
                            .to_string(),
                        enable_release_eta: false,
                        enable_treeherder: true,
                    },
                ),
                github(
                    "app-services",
                    "Application Services",
                    Repository {
                        pretty_name: Some("Staging Application Services".to_string()),
                        project: Some("app-services".to_string()),
                        repo: "https://github.com/mozilla-releng/staging-application-services"
                            .to_string(),
                        enable_release_eta: false,
                        enable_treeherder: false,
                    },
                ),
            ],
            xpi_manifest: Some(XpiManifest {
                branch: "main".to_string(),
                owner: "mozilla-releng".to_string(),
                project: "staging-xpi-manifest".to_string(),
                repo: "https://github.com/mozilla-releng/staging-xpi-manifest".to_string(),
            }),
        }
    }

    /// Load a catalog from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read product catalog {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse product catalog {}", path.display()))
    }

    pub fn product(&self, product: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.product == product)
    }

    pub fn branch(&self, product: &str, branch: &str) -> Option<(&Product, &Branch)> {
        let p = self.product(product)?;
        p.branch(branch).map(|b| (p, b))
    }

    /// Every (product, branch) pair with a named branch, in catalog order.
    pub fn product_branches(&self) -> Vec<(String, String)> {
        self.products
            .iter()
            .flat_map(|p| {
                p.branches
                    .iter()
                    .filter(|b| !b.branch.is_empty())
                    .map(|b| (p.product.clone(), b.branch.clone()))
            })
            .collect()
    }
}

/// Treeherder page for a push.
pub fn treeherder_url(base: &str, project: &str, revision: &str) -> String {
    format!(
        "{}/jobs?repo={}&revision={}",
        base.trim_end_matches('/'),
        project,
        revision
    )
}
