//! Wire types exchanged with the release-management service.
//!
//! Every record keeps fields it does not model in `extra`, so a release can
//! be reshaped and re-serialized without dropping data.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::version::BuildId;

/// An approval required before a phase may run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signoff {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub signed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    #[serde(default)]
    pub submitted: bool,
    #[serde(
        rename = "actionTaskId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub action_task_id: Option<String>,
    /// Taskcluster state of the action task, filled in by pending listings.
    #[serde(rename = "tcStatus", default, skip_serializing_if = "Option::is_none")]
    pub tc_status: Option<String>,
    #[serde(default)]
    pub signoffs: Vec<Signoff>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Phase {
    /// Action task to poll, if the phase was submitted with one.
    pub fn pending_task(&self) -> Option<&str> {
        if !self.submitted {
            return None;
        }
        self.action_task_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    pub name: String,
    pub product: String,
    pub branch: String,
    pub version: String,
    pub build_number: u32,
    pub revision: String,
    pub status: String,
    pub phases: Vec<Phase>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Release {
    pub fn build_id(&self) -> BuildId {
        BuildId::new(self.version.clone(), self.build_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpiRelease {
    pub name: String,
    pub xpi_name: String,
    pub xpi_version: String,
    pub build_number: u32,
    pub revision: String,
    pub xpi_revision: String,
    pub status: String,
    pub phases: Vec<Phase>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Records that carry phases and can be decorated by pending listings.
pub trait Phased: Send {
    fn name(&self) -> &str;
    fn phases(&self) -> &[Phase];
    fn set_phases(&mut self, phases: Vec<Phase>);
}

impl Phased for Release {
    fn name(&self) -> &str {
        &self.name
    }
    fn phases(&self) -> &[Phase] {
        &self.phases
    }
    fn set_phases(&mut self, phases: Vec<Phase>) {
        self.phases = phases;
    }
}

impl Phased for XpiRelease {
    fn name(&self) -> &str {
        &self.name
    }
    fn phases(&self) -> &[Phase] {
        &self.phases
    }
    fn set_phases(&mut self, phases: Vec<Phase>) {
        self.phases = phases;
    }
}

/// Product name → branches currently disabled.
pub type DisabledProducts = BTreeMap<String, Vec<String>>;

/// One entry of a release's `partial_updates` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialUpdate {
    #[serde(rename = "buildNumber")]
    pub build_number: u32,
    pub locales: Vec<String>,
}

/// Partial version → update definition.
pub type PartialUpdates = BTreeMap<String, PartialUpdate>;

/// What the caller supplies to create a release.
#[derive(Debug, Clone, Default)]
pub struct NewRelease {
    pub revision: String,
    pub version: String,
    pub build_number: u32,
    pub release_eta: Option<DateTime<Utc>>,
    /// `<version>build<n>` entries; blanks are ignored.
    pub partial_versions: Vec<String>,
}

/// Body of `POST /releases`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseRequest {
    pub branch: String,
    pub build_number: u32,
    pub product: String,
    pub repo_url: String,
    pub revision: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_eta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_updates: Option<PartialUpdates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_key: Option<String>,
}

/// ISO-8601 UTC with millisecond precision, e.g. `2019-08-20T10:00:00.000Z`.
pub fn format_eta(eta: &DateTime<Utc>) -> String {
    eta.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Body of `POST /xpi/releases`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewXpiRelease {
    /// Revision of the XPI manifest repository.
    #[serde(rename = "revision")]
    pub manifest_revision: String,
    pub xpi_revision: String,
    pub xpi_name: String,
    pub xpi_version: String,
    pub build_number: u32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ProductBranch<'a> {
    pub product: &'a str,
    pub branch: &'a str,
}
