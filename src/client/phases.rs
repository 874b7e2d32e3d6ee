use futures::future::try_join_all;
use reqwest::{Method, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::{Api, ReleaseKind, ShipitClient};
use crate::error::{ShipitError, ShipitResult};
use crate::taskcluster::{TaskStatus, TaskStatusResponse, task_status_url};
use crate::types::{Phase, Phased, Release, Signoff, XpiRelease};

#[derive(Deserialize)]
struct SignoffsResponse {
    #[serde(default)]
    signoffs: Vec<Signoff>,
}

impl ShipitClient {
    /// Releases still in flight, each phase decorated with its sign-offs and,
    /// for submitted phases, the Taskcluster state of the action task.
    pub async fn get_pending_releases(&self) -> ShipitResult<Vec<Release>> {
        self.pending(ReleaseKind::Gecko).await
    }

    pub async fn get_pending_xpi_releases(&self) -> ShipitResult<Vec<XpiRelease>> {
        self.pending(ReleaseKind::Xpi).await
    }

    async fn pending<T>(&self, kind: ReleaseKind) -> ShipitResult<Vec<T>>
    where
        T: Phased + DeserializeOwned,
    {
        let url = self.http.url(kind.listing_api(), kind.releases_path(), &[])?;
        let releases: Vec<T> = self.http.get(url).await?;
        debug!(count = releases.len(), "decorating pending releases");

        try_join_all(releases.into_iter().map(|mut release| async move {
            let name = release.name().to_string();
            let phases = release.phases().to_vec();
            let decorated =
                try_join_all(phases.into_iter().map(|p| self.decorate_phase(kind, &name, p)))
                    .await?;
            release.set_phases(decorated);
            Ok::<_, ShipitError>(release)
        }))
        .await
    }

    async fn decorate_phase(
        &self,
        kind: ReleaseKind,
        release: &str,
        mut phase: Phase,
    ) -> ShipitResult<Phase> {
        phase.signoffs = self.get_phase_signoffs(kind, release, &phase.name).await?;

        if let Some(task_id) = phase.pending_task().map(str::to_string)
            && let Some(status) = self.task_status(&task_id).await
        {
            phase.tc_status = Some(status.state);
        }
        Ok(phase)
    }

    pub async fn get_phase_signoffs(
        &self,
        kind: ReleaseKind,
        release: &str,
        phase: &str,
    ) -> ShipitResult<Vec<Signoff>> {
        let path = format!("{}/{}/{}", kind.signoff_path(), release, phase);
        let url = self.http.url(Api::Private, &path, &[])?;
        let response: SignoffsResponse = self.http.get(url).await?;
        Ok(response.signoffs)
    }

    /// Status of a Taskcluster task. Expired or unknown tasks, and any
    /// failure to ask, yield `None`.
    pub async fn task_status(&self, task_id: &str) -> Option<TaskStatus> {
        let raw = task_status_url(&self.taskcluster_root_url, task_id);
        let url = match Url::parse(&raw) {
            Ok(url) => url,
            Err(e) => {
                debug!(url = %raw, error = %e, "bad taskcluster url");
                return None;
            }
        };
        match self.http.get::<TaskStatusResponse>(url).await {
            Ok(response) => Some(response.status),
            Err(e) => {
                debug!(task_id, error = %e, "task status unavailable");
                None
            }
        }
    }

    /// Trigger a phase of a release.
    pub async fn schedule_phase(
        &self,
        kind: ReleaseKind,
        release: &str,
        phase: &str,
    ) -> ShipitResult<Phase> {
        info!(release, phase, "scheduling phase");
        let path = format!("{}/{}/{}", kind.releases_path(), release, phase);
        let url = self.http.url(Api::Private, &path, &[])?;
        self.http
            .send(Method::PUT, url, Some(&serde_json::json!({})))
            .await
    }

    pub async fn cancel_release(&self, kind: ReleaseKind, release: &str) -> ShipitResult<Value> {
        info!(release, "cancelling release");
        let path = format!("{}/{}", kind.releases_path(), release);
        let url = self.http.url(Api::Private, &path, &[])?;
        self.http.send::<(), _>(Method::DELETE, url, None).await
    }

    /// Sign off a phase as `uid`. The UID travels as a bare JSON string.
    pub async fn phase_sign_off(
        &self,
        kind: ReleaseKind,
        release: &str,
        phase: &str,
        uid: &str,
    ) -> ShipitResult<Value> {
        info!(release, phase, uid, "signing off phase");
        let path = format!("{}/{}/{}", kind.signoff_path(), release, phase);
        let url = self.http.url(Api::Private, &path, &[])?;
        self.http.send(Method::PUT, url, Some(uid)).await
    }
}
