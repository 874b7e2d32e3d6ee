use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{LocaleSource, RepoHost, changesets_path};
use crate::consts::{DEFAULT_GITHUB_API_URL, DEFAULT_TIMEOUT_SECS, USER_AGENT};
use crate::error::{ShipitError, ShipitResult};

/// Reads locale manifests from hg.mozilla.org or GitHub over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLocaleSource {
    client: reqwest::Client,
    github_api_url: String,
}

#[derive(Deserialize)]
struct GitHubContents {
    content: String,
    #[serde(default)]
    encoding: String,
}

impl HttpLocaleSource {
    pub fn new() -> ShipitResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ShipitError::Network {
                message: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
        })
    }

    pub fn with_github_api_url(mut self, url: impl Into<String>) -> Self {
        self.github_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_bytes(&self, repo: &str, url: &str) -> ShipitResult<Vec<u8>> {
        let locales_err = |message: String| ShipitError::Locales {
            repo: repo.to_string(),
            message,
        };

        debug!(url = %url, "fetching locale manifest");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| locales_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(locales_err(format!("HTTP {} from {}", status.as_u16(), url)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| locales_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn read_manifest(
        &self,
        repo: &str,
        revision: &str,
        app_name: &str,
    ) -> ShipitResult<Vec<u8>> {
        let path = changesets_path(app_name);
        match RepoHost::classify(repo) {
            RepoHost::Mercurial(base) => {
                let url = format!("{base}/raw-file/{revision}/{path}");
                self.fetch_bytes(repo, &url).await
            }
            RepoHost::GitHub { owner, name } => {
                let url = format!(
                    "{}/repos/{owner}/{name}/contents/{path}?ref={revision}",
                    self.github_api_url
                );
                let body = self.fetch_bytes(repo, &url).await?;
                decode_github_contents(&body).map_err(|message| ShipitError::Locales {
                    repo: repo.to_string(),
                    message,
                })
            }
        }
    }
}

fn decode_github_contents(body: &[u8]) -> Result<Vec<u8>, String> {
    let contents: GitHubContents =
        serde_json::from_slice(body).map_err(|e| format!("bad contents response: {e}"))?;
    if !contents.encoding.is_empty() && contents.encoding != "base64" {
        return Err(format!("unsupported encoding {}", contents.encoding));
    }
    // GitHub wraps base64 at 60 columns.
    let compact: String = contents
        .content
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|e| format!("bad base64 content: {e}"))
}

/// Locale codes are the manifest's top-level keys.
fn parse_locales(manifest: &[u8]) -> Result<Vec<String>, String> {
    let map: Map<String, Value> =
        serde_json::from_slice(manifest).map_err(|e| format!("bad locale manifest: {e}"))?;
    let mut locales: Vec<String> = map.into_iter().map(|(k, _)| k).collect();
    locales.sort();
    Ok(locales)
}

#[async_trait]
impl LocaleSource for HttpLocaleSource {
    async fn get_locales(
        &self,
        repo: &str,
        revision: &str,
        app_name: &str,
    ) -> ShipitResult<Vec<String>> {
        let manifest = self.read_manifest(repo, revision, app_name).await?;
        parse_locales(&manifest).map_err(|message| ShipitError::Locales {
            repo: repo.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_locales_sorts_keys() {
        let manifest = br#"{"fr": {"revision": "a"}, "de": {"revision": "b"}, "ach": {}}"#;
        assert_eq!(parse_locales(manifest).unwrap(), vec!["ach", "de", "fr"]);
    }

    #[test]
    fn parse_locales_rejects_non_objects() {
        assert!(parse_locales(b"[\"de\"]").is_err());
        assert!(parse_locales(b"not json").is_err());
    }

    #[test]
    fn decode_wrapped_base64() {
        let encoded = STANDARD.encode(br#"{"de": {}}"#);
        let (a, b) = encoded.split_at(6);
        let body = serde_json::json!({"content": format!("{a}\n{b}\n"), "encoding": "base64"});
        let decoded = decode_github_contents(body.to_string().as_bytes()).unwrap();
        assert_eq!(decoded, br#"{"de": {}}"#);
    }

    #[test]
    fn decode_rejects_other_encodings() {
        let body = br#"{"content": "x", "encoding": "utf-8"}"#;
        assert!(decode_github_contents(body).is_err());
    }
}
