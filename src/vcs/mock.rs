use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::LocaleSource;
use crate::error::{ShipitError, ShipitResult};

/// A canned locale source for tests. Keyed by `(repo, revision)`; records
/// every lookup it serves.
#[derive(Debug, Default)]
pub struct MockLocales {
    locales: HashMap<(String, String), Vec<String>>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl MockLocales {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, repo: &str, revision: &str, locales: &[&str]) -> Self {
        self.locales.insert(
            (repo.to_string(), revision.to_string()),
            locales.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    /// `(repo, revision, app_name)` of every lookup so far.
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocaleSource for MockLocales {
    async fn get_locales(
        &self,
        repo: &str,
        revision: &str,
        app_name: &str,
    ) -> ShipitResult<Vec<String>> {
        self.calls.lock().unwrap().push((
            repo.to_string(),
            revision.to_string(),
            app_name.to_string(),
        ));
        self.locales
            .get(&(repo.to_string(), revision.to_string()))
            .cloned()
            .ok_or_else(|| ShipitError::Locales {
                repo: repo.to_string(),
                message: format!("MockLocales: nothing registered for revision {revision}"),
            })
    }
}
