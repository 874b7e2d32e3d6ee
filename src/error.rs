//! Error types for the API client.

use std::time::Duration;

/// Errors raised while talking to the release-management service.
#[derive(Debug, thiserror::Error)]
pub enum ShipitError {
    /// Resource does not exist.
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Token rejected by the service (401/403).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// An authenticated endpoint was called without a token.
    #[error("no access token configured; run `shipit token set` or set SHIPIT_TOKEN")]
    MissingToken,

    /// Rate limit exceeded.
    #[error("rate limited: retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// The service rejected the request (4xx other than the above).
    #[error("request rejected (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The service failed (5xx).
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Transport-level failure.
    #[error("network error: {message}")]
    Network { message: String },

    /// Body could not be decoded.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// A configured base URL could not be parsed.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Malformed `<version>build<number>` identifier.
    #[error("invalid build id {value:?}: {reason}")]
    InvalidBuildId { value: String, reason: String },

    /// A partial version did not resolve to exactly one shipped release.
    #[error("Cannot obtain proper information for {product} {branch} {version} build {build_number}")]
    PartialLookup {
        product: String,
        branch: String,
        version: String,
        build_number: u32,
    },

    /// Locale list could not be read from the repository.
    #[error("failed to read locales from {repo}: {message}")]
    Locales { repo: String, message: String },

    /// Product catalog is missing something the operation needs.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl ShipitError {
    /// Exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => 1,
            Self::Config { .. } => 1,
            Self::InvalidBuildId { .. } => 1,
            Self::InvalidUrl { .. } => 1,

            Self::Unauthorized { .. } => 2,
            Self::MissingToken => 2,

            Self::Api { .. } => 3,
            Self::PartialLookup { .. } => 3,
            Self::Locales { .. } => 3,

            Self::RateLimited { .. } => 5,
            Self::Network { .. } => 5,
            Self::Server { .. } => 5,

            Self::InvalidResponse { .. } => 6,
        }
    }

    /// Whether a GET may be retried after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Network { .. } | Self::Server { .. }
        )
    }
}

impl From<reqwest::Error> for ShipitError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::InvalidResponse {
                message: err.to_string(),
            };
        }
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for client operations.
pub type ShipitResult<T> = Result<T, ShipitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(ShipitError::Network {
            message: "reset".into()
        }
        .is_retryable());
        assert!(ShipitError::Server {
            status: 502,
            message: "bad gateway".into()
        }
        .is_retryable());
        assert!(ShipitError::RateLimited { retry_after: None }.is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!ShipitError::MissingToken.is_retryable());
        assert!(!ShipitError::Api {
            status: 400,
            message: "bad".into()
        }
        .is_retryable());
        assert!(!ShipitError::NotFound { url: "/x".into() }.is_retryable());
    }

    #[test]
    fn partial_lookup_message_names_the_build() {
        let err = ShipitError::PartialLookup {
            product: "firefox".into(),
            branch: "releases/mozilla-beta".into(),
            version: "69.0b5".into(),
            build_number: 1,
        };
        assert_eq!(
            err.to_string(),
            "Cannot obtain proper information for firefox releases/mozilla-beta 69.0b5 build 1"
        );
    }

    #[test]
    fn auth_errors_share_exit_code() {
        assert_eq!(ShipitError::MissingToken.exit_code(), 2);
        assert_eq!(
            ShipitError::Unauthorized {
                message: "expired".into()
            }
            .exit_code(),
            2
        );
    }
}
