use anyhow::Result;

use super::Session;
use crate::render;
use crate::types::NewXpiRelease;

pub async fn recent(session: &Session, limit: usize) -> Result<()> {
    let releases = session.client.get_recent_xpi_releases(limit).await?;
    session.emit(&releases, |releases| {
        releases
            .iter()
            .map(|r| format!("{}\n", render::xpi_release_line(r)))
            .collect()
    })
}

pub async fn pending(session: &Session) -> Result<()> {
    let releases = session.client.get_pending_xpi_releases().await?;
    session.emit(&releases, |releases| {
        if releases.is_empty() {
            return "no pending xpi releases\n".to_string();
        }
        releases
            .iter()
            .map(|r| render::pending_release(&r.name, &r.phases))
            .collect()
    })
}

pub async fn build_numbers(session: &Session, xpi_name: &str, xpi_version: &str) -> Result<()> {
    let numbers = session
        .client
        .get_xpi_build_numbers(xpi_name, xpi_version)
        .await?;
    session.emit(&numbers, |numbers| {
        let list: Vec<String> = numbers.iter().map(u32::to_string).collect();
        format!("{}\n", list.join(" "))
    })
}

/// Arguments of `shipit xpi submit`.
#[derive(Debug, Clone, Default)]
pub struct SubmitArgs {
    pub manifest_revision: String,
    pub xpi_revision: String,
    pub xpi_name: String,
    pub xpi_version: String,
    pub build_number: Option<u32>,
}

pub async fn submit(session: &Session, args: SubmitArgs) -> Result<()> {
    let build_number = match args.build_number {
        Some(n) => n,
        None => {
            session
                .client
                .guess_xpi_build_number(&args.xpi_name, &args.xpi_version)
                .await?
        }
    };

    let release = session
        .client
        .submit_xpi_release(&NewXpiRelease {
            manifest_revision: args.manifest_revision,
            xpi_revision: args.xpi_revision,
            xpi_name: args.xpi_name,
            xpi_version: args.xpi_version,
            build_number,
        })
        .await?;

    session.emit(&release, |r| format!("created {}\n", r.name))
}
