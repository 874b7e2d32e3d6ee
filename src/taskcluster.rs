//! Taskcluster URL building and task status types.

use serde::Deserialize;

const LEGACY_ROOT_URL: &str = "https://taskcluster.net";

/// URL of a Taskcluster service endpoint under `root_url`.
///
/// The legacy deployment serves each service from its own host; every other
/// deployment routes through `<root>/api/<service>/<version>`.
pub fn api_url(root_url: &str, service: &str, version: &str, path: &str) -> String {
    let root = root_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if root == LEGACY_ROOT_URL {
        format!("https://{service}.taskcluster.net/{version}/{path}")
    } else {
        format!("{root}/api/{service}/{version}/{path}")
    }
}

/// Queue URL of a task's status.
pub fn task_status_url(root_url: &str, task_id: &str) -> String {
    api_url(root_url, "queue", "v1", &format!("/task/{task_id}/status"))
}

/// Response of the queue's `task/<id>/status` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatusResponse {
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    #[serde(default)]
    pub task_id: String,
    /// `unscheduled`, `pending`, `running`, `completed`, `failed` or `exception`.
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modern_root_routes_through_api() {
        assert_eq!(
            task_status_url("https://firefox-ci-tc.services.mozilla.com/", "abc"),
            "https://firefox-ci-tc.services.mozilla.com/api/queue/v1/task/abc/status"
        );
    }

    #[test]
    fn legacy_root_uses_service_host() {
        assert_eq!(
            task_status_url("https://taskcluster.net", "abc"),
            "https://queue.taskcluster.net/v1/task/abc/status"
        );
    }

    #[test]
    fn parses_status_state() {
        let resp: TaskStatusResponse = serde_json::from_str(
            r#"{"status": {"taskId": "abc", "state": "completed", "runs": []}}"#,
        )
        .unwrap();
        assert_eq!(resp.status.task_id, "abc");
        assert_eq!(resp.status.state, "completed");
    }
}
