//! Client for the release-management service.
//!
//! Operations are grouped by area in the submodules; all of them go through
//! [`HttpBackend`] for URL building, auth and status handling.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::consts::{
    DEFAULT_API_URL, DEFAULT_MAX_RETRIES, DEFAULT_PUBLIC_API_URL, DEFAULT_TASKCLUSTER_ROOT_URL,
    DEFAULT_TIMEOUT_SECS, USER_AGENT as USER_AGENT_VALUE,
};
use crate::error::{ShipitError, ShipitResult};
use crate::vcs::{HttpLocaleSource, LocaleSource};

mod disabled;
mod http;
mod phases;
mod releases;
mod xpi;

pub(crate) use http::Api;
use http::HttpBackend;

/// Connection settings for [`ShipitClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub public_api_url: String,
    pub taskcluster_root_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            public_api_url: DEFAULT_PUBLIC_API_URL.to_string(),
            taskcluster_root_url: DEFAULT_TASKCLUSTER_ROOT_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ClientConfig {
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_public_api_url(mut self, url: impl Into<String>) -> Self {
        self.public_api_url = url.into();
        self
    }

    /// Point both the private and the public API at the same server.
    pub fn with_base_url(self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.with_api_url(url.clone()).with_public_api_url(url)
    }

    pub fn with_taskcluster_root_url(mut self, url: impl Into<String>) -> Self {
        self.taskcluster_root_url = url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// Which family of releases an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseKind {
    /// Firefox, Thunderbird and friends.
    #[default]
    Gecko,
    /// Browser extensions.
    Xpi,
}

impl ReleaseKind {
    pub fn releases_path(self) -> &'static str {
        match self {
            Self::Gecko => "/releases",
            Self::Xpi => "/xpi/releases",
        }
    }

    pub fn signoff_path(self) -> &'static str {
        match self {
            Self::Gecko => "/signoff",
            Self::Xpi => "/xpi/signoff",
        }
    }

    /// Release listings are served from the public mirror, XPI ones are not.
    pub(crate) fn listing_api(self) -> Api {
        match self {
            Self::Gecko => Api::Public,
            Self::Xpi => Api::Private,
        }
    }
}

/// Client for releases, phases, sign-offs and product enablement.
#[derive(Clone)]
pub struct ShipitClient {
    http: HttpBackend,
    taskcluster_root_url: String,
    locales: Arc<dyn LocaleSource>,
}

impl std::fmt::Debug for ShipitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShipitClient")
            .field("api_url", &self.http.api_url)
            .field("public_api_url", &self.http.public_api_url)
            .field("taskcluster_root_url", &self.taskcluster_root_url)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl ShipitClient {
    pub fn new(config: ClientConfig) -> ShipitResult<Self> {
        let locales = HttpLocaleSource::new()?;
        Self::with_locale_source(config, Arc::new(locales))
    }

    pub fn with_locale_source(
        config: ClientConfig,
        locales: Arc<dyn LocaleSource>,
    ) -> ShipitResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ShipitError::Network {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            http: HttpBackend {
                client,
                api_url: config.api_url.trim_end_matches('/').to_string(),
                public_api_url: config.public_api_url.trim_end_matches('/').to_string(),
                token: config.token.filter(|t| !t.is_empty()),
                max_retries: config.max_retries,
            },
            taskcluster_root_url: config.taskcluster_root_url,
            locales,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.http.api_url
    }

    pub fn public_api_url(&self) -> &str {
        &self.http.public_api_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.http.token.is_some()
    }

    pub(crate) fn locale_source(&self) -> &dyn LocaleSource {
        self.locales.as_ref()
    }
}
