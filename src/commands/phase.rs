use anyhow::Result;

use super::Session;
use crate::client::ReleaseKind;
use crate::render;

pub async fn schedule(session: &Session, kind: ReleaseKind, release: &str, phase: &str) -> Result<()> {
    let scheduled = session.client.schedule_phase(kind, release, phase).await?;
    session.emit(&scheduled, |p| format!("{}\n", render::phase_line(p)))
}

pub async fn signoff(
    session: &Session,
    kind: ReleaseKind,
    release: &str,
    phase: &str,
    uid: &str,
) -> Result<()> {
    let response = session
        .client
        .phase_sign_off(kind, release, phase, uid)
        .await?;
    session.emit(&response, |_| format!("signed off {release} {phase} as {uid}\n"))
}
