//! Version and build identifier helpers.
//!
//! A build id is the string form `<version>build<number>` used throughout
//! the console, e.g. `69.0b5build1`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ShipitError, ShipitResult};

static RC_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.0$").unwrap());

/// Whether `version` is a release candidate: a plain `N.0` major release.
///
/// Betas (`70.0b3`), ESRs (`68.1.0esr`) and dot releases (`69.0.1`) are not.
pub fn is_rc(version: &str) -> bool {
    RC_VERSION.is_match(version)
}

/// A parsed `<version>build<number>` identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildId {
    pub version: String,
    pub build_number: u32,
}

impl BuildId {
    pub fn new(version: impl Into<String>, build_number: u32) -> Self {
        Self {
            version: version.into(),
            build_number,
        }
    }

    pub fn parse(value: &str) -> ShipitResult<Self> {
        let invalid = |reason: &str| ShipitError::InvalidBuildId {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let (version, number) = value
            .split_once("build")
            .ok_or_else(|| invalid("missing `build` separator"))?;

        if version.is_empty() {
            return Err(invalid("empty version"));
        }

        let build_number: u32 = number
            .parse()
            .map_err(|_| invalid("build number is not an integer"))?;
        if build_number == 0 {
            return Err(invalid("build numbers start at 1"));
        }

        Ok(Self::new(version, build_number))
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}build{}", self.version, self.build_number)
    }
}

/// Split a comma-separated partials list, dropping blanks left by trailing
/// or doubled commas.
pub fn split_partial_versions(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
