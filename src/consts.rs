//! Project-wide constants.

use std::path::PathBuf;

/// Sent as `User-Agent` on every request.
pub const USER_AGENT: &str = concat!("shipit/", env!("CARGO_PKG_VERSION"));

/// Private (authenticated) API of the staging deployment.
pub const DEFAULT_API_URL: &str = "https://shipit-api.staging.mozilla-releng.net";

/// Public, read-only mirror of the API.
pub const DEFAULT_PUBLIC_API_URL: &str = "https://shipit-api-public.staging.mozilla-releng.net";

pub const DEFAULT_TASKCLUSTER_ROOT_URL: &str = "https://firefox-ci-tc.services.mozilla.com";
pub const DEFAULT_TREEHERDER_URL: &str = "https://treeherder.mozilla.org";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Environment variable holding a bearer token when none is stored.
pub const TOKEN_ENV_VAR: &str = "SHIPIT_TOKEN";

/// Partials suggested when a branch does not configure its own count.
pub const DEFAULT_NUMBER_OF_PARTIALS: usize = 3;

/// Releases shown per product/branch in "recent" listings.
pub const DEFAULT_RECENT_LIMIT: usize = 4;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default database path: `~/.shipit/shipit.db`.
/// Single DB for settings and credentials.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".shipit")
        .join("shipit.db")
}
