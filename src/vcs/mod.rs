//! Locale discovery in product repositories.
//!
//! Partial updates list the locales shipped by the older release, read from
//! `<app>/locales/l10n-changesets.json` at that release's revision.

pub mod http;
pub mod mock;

use async_trait::async_trait;

use crate::error::ShipitResult;

pub use http::HttpLocaleSource;
pub use mock::MockLocales;

/// Where a repository is hosted, as far as locale lookups care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoHost<'a> {
    GitHub { owner: &'a str, name: &'a str },
    Mercurial(&'a str),
}

impl<'a> RepoHost<'a> {
    pub fn classify(repo: &'a str) -> Self {
        if let Some((_, rest)) = repo.split_once("github.com/") {
            let rest = rest.trim_end_matches('/');
            let rest = rest.strip_suffix(".git").unwrap_or(rest);
            if let Some((owner, name)) = rest.split_once('/')
                && !owner.is_empty()
                && !name.is_empty()
            {
                return Self::GitHub { owner, name };
            }
        }
        Self::Mercurial(repo.trim_end_matches('/'))
    }
}

/// Path of the locale manifest inside a repository.
pub fn changesets_path(app_name: &str) -> String {
    format!("{app_name}/locales/l10n-changesets.json")
}

/// Reads the locales shipped at a given revision.
#[async_trait]
pub trait LocaleSource: Send + Sync {
    async fn get_locales(
        &self,
        repo: &str,
        revision: &str,
        app_name: &str,
    ) -> ShipitResult<Vec<String>>;
}
