//! HTTP layer: URL building, auth, status mapping and retry.
//!
//! The operation modules never look at status codes; everything that
//! interprets a response status lives here.

use std::time::Duration;

use rand::RngExt;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ShipitError, ShipitResult};

/// Which of the two service deployments a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Api {
    /// Read-only mirror; never sees the token.
    Public,
    Private,
}

#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) api_url: String,
    pub(crate) public_api_url: String,
    pub(crate) token: Option<String>,
    pub(crate) max_retries: u32,
}

const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);
const MAX_BACKOFF: Duration = Duration::from_secs(5);
const BASE_BACKOFF_MS: u64 = 250;

impl HttpBackend {
    /// Build an endpoint URL. Query pairs without a value are left out.
    pub(crate) fn url(
        &self,
        api: Api,
        path: &str,
        query: &[(&str, Option<&str>)],
    ) -> ShipitResult<Url> {
        let base = match api {
            Api::Public => &self.public_api_url,
            Api::Private => &self.api_url,
        };
        let raw = format!("{}/{}", base, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|e| ShipitError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        let present: Vec<_> = query
            .iter()
            .filter_map(|(k, v)| v.map(|v| (*k, v)))
            .collect();
        if !present.is_empty() {
            url.query_pairs_mut().extend_pairs(present);
        }
        Ok(url)
    }

    /// Unauthenticated GET, retried on transient failures.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> ShipitResult<T> {
        let mut retries = 0;

        loop {
            debug!(url = %url, "GET");
            let result = match self.client.get(url.clone()).send().await {
                Ok(response) => decode(check_status(response).await).await,
                Err(e) => Err(e.into()),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    let backoff = backoff_for(&e, retries);
                    warn!(
                        error = %e,
                        retry = retries,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying request"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Authenticated request. Never retried.
    pub(crate) async fn send<B, T>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> ShipitResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.token.as_deref().ok_or(ShipitError::MissingToken)?;

        debug!(method = %method, url = %url, "sending authenticated request");
        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {token}"));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        decode(check_status(response).await).await
    }
}

async fn check_status(response: reqwest::Response) -> ShipitResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            let body = response.text().await.unwrap_or_default();
            Err(ShipitError::Unauthorized {
                message: if body.is_empty() {
                    format!("HTTP {} from {}", status.as_u16(), url)
                } else {
                    error_message(body)
                },
            })
        }
        StatusCode::NOT_FOUND => Err(ShipitError::NotFound { url }),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(ShipitError::RateLimited { retry_after })
        }
        _ => {
            let message = response
                .text()
                .await
                .ok()
                .filter(|t| !t.is_empty())
                .map(error_message)
                .unwrap_or_else(|| status.to_string());
            if status.is_server_error() {
                Err(ShipitError::Server {
                    status: status.as_u16(),
                    message,
                })
            } else {
                Err(ShipitError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

/// Problem-details bodies are reduced to their `detail`, or `title` when
/// there is none. Anything else is kept verbatim.
fn error_message(body: String) -> String {
    let Ok(problem) = serde_json::from_str::<serde_json::Value>(&body) else {
        return body;
    };
    ["detail", "title"]
        .iter()
        .find_map(|key| {
            problem
                .get(key)
                .and_then(serde_json::Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .unwrap_or(body)
}

/// Decode a JSON body. An empty body decodes as `null`.
async fn decode<T: DeserializeOwned>(
    response: ShipitResult<reqwest::Response>,
) -> ShipitResult<T> {
    let text = response?.text().await?;
    let text = if text.trim().is_empty() { "null" } else { &text };
    serde_json::from_str(text).map_err(|e| ShipitError::InvalidResponse {
        message: format!("failed to decode response: {e}"),
    })
}

fn backoff_for(err: &ShipitError, attempt: u32) -> Duration {
    let mut rng = rand::rng();
    match err {
        ShipitError::RateLimited {
            retry_after: Some(retry_after),
        } => {
            let base_ms = (*retry_after).min(MAX_RETRY_AFTER).as_millis() as f64;
            let jitter: f64 = rng.random_range(0.9_f64..=1.1_f64);
            Duration::from_millis(((base_ms * jitter).round() as u64).max(100))
        }
        _ => {
            let base = Duration::from_millis(BASE_BACKOFF_MS << attempt.min(8)).min(MAX_BACKOFF);
            let jittered = rng.random_range(0..=base.as_millis() as u64);
            Duration::from_millis(jittered.max(10))
        }
    }
}
