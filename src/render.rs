//! Plain-text rendering of releases and product state for the terminal.

use crate::products::ProductCatalog;
use crate::types::{DisabledProducts, Phase, Release, XpiRelease};

/// `name  status` line for a release listing.
pub fn release_line(release: &Release) -> String {
    format!(
        "{:<40} {:<10} {}",
        release.name,
        release.status,
        short_revision(&release.revision)
    )
}

pub fn xpi_release_line(release: &XpiRelease) -> String {
    format!(
        "{:<40} {:<10} {}",
        release.name,
        release.status,
        short_revision(&release.xpi_revision)
    )
}

fn short_revision(revision: &str) -> &str {
    revision.get(..12).unwrap_or(revision)
}

/// One line per phase: state marker, name, task state and sign-off count.
pub fn phase_line(phase: &Phase) -> String {
    let marker = match (phase.submitted, phase.tc_status.as_deref()) {
        (false, _) => " ",
        (true, Some("completed")) => "✓",
        (true, Some("failed" | "exception")) => "✗",
        (true, _) => "…",
    };
    let signed = phase.signoffs.iter().filter(|s| s.signed).count();

    let mut line = format!("  [{marker}] {}", phase.name);
    if let Some(state) = &phase.tc_status {
        line.push_str(&format!(" ({state})"));
    }
    if !phase.signoffs.is_empty() {
        line.push_str(&format!("  signoffs {}/{}", signed, phase.signoffs.len()));
    }
    line
}

pub fn pending_release(name: &str, phases: &[Phase]) -> String {
    let mut out = format!("{name}\n");
    for phase in phases {
        out.push_str(&phase_line(phase));
        out.push('\n');
    }
    out
}

pub fn disabled_products(disabled: &DisabledProducts) -> String {
    if disabled.values().all(Vec::is_empty) {
        return "  no disabled products\n".to_string();
    }
    let mut out = String::new();
    for (product, branches) in disabled {
        for branch in branches {
            out.push_str(&format!("  {product:<20} {branch}\n"));
        }
    }
    out
}

/// Catalog overview, marking disabled branches.
pub fn catalog(catalog: &ProductCatalog, disabled: &DisabledProducts) -> String {
    let mut out = String::new();
    for product in &catalog.products {
        let partials = if product.enable_partials {
            "partials"
        } else {
            "no partials"
        };
        out.push_str(&format!(
            "{} ({}, {partials})\n",
            product.pretty_name, product.product
        ));
        for branch in product.branches.iter().filter(|b| !b.branch.is_empty()) {
            let off = disabled
                .get(&product.product)
                .is_some_and(|bs| bs.contains(&branch.branch));
            out.push_str(&format!(
                "  {:<30} {}\n",
                branch.branch,
                if off { "disabled" } else { "enabled" }
            ));
        }
        for repo in &product.repositories {
            out.push_str(&format!("  {}\n", repo.repo));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Signoff;

    fn signoff(signed: bool) -> Signoff {
        Signoff {
            signed,
            ..Signoff::default()
        }
    }

    #[test]
    fn unsubmitted_phase_has_blank_marker() {
        let phase = Phase {
            name: "promote_firefox".into(),
            ..Phase::default()
        };
        assert_eq!(phase_line(&phase), "  [ ] promote_firefox");
    }

    #[test]
    fn completed_phase_shows_state_and_signoffs() {
        let phase = Phase {
            name: "ship_firefox".into(),
            submitted: true,
            tc_status: Some("completed".into()),
            signoffs: vec![signoff(true), signoff(false)],
            ..Phase::default()
        };
        assert_eq!(
            phase_line(&phase),
            "  [✓] ship_firefox (completed)  signoffs 1/2"
        );
    }

    #[test]
    fn failed_phase_is_crossed() {
        let phase = Phase {
            name: "push".into(),
            submitted: true,
            tc_status: Some("exception".into()),
            ..Phase::default()
        };
        assert!(phase_line(&phase).starts_with("  [✗]"));
    }

    #[test]
    fn release_line_shortens_revision() {
        let release = Release {
            name: "Firefox-70.0-build1".into(),
            status: "shipped".into(),
            revision: "0123456789abcdef".into(),
            ..Release::default()
        };
        let line = release_line(&release);
        assert!(line.ends_with("0123456789ab"));
        assert!(line.starts_with("Firefox-70.0-build1"));
    }

    #[test]
    fn disabled_products_empty() {
        assert_eq!(
            disabled_products(&DisabledProducts::new()),
            "  no disabled products\n"
        );
    }

    #[test]
    fn catalog_marks_disabled_branches() {
        let mut disabled = DisabledProducts::new();
        disabled.insert("firefox".into(), vec!["try".into()]);
        let text = catalog(&ProductCatalog::builtin(), &disabled);
        assert!(text.contains("Firefox Desktop (firefox, partials)"));
        let firefox_try = text
            .lines()
            .skip_while(|l| !l.starts_with("Firefox Desktop"))
            .nth(1)
            .unwrap();
        assert!(firefox_try.ends_with("disabled"));
        assert!(text.contains("https://github.com/mozilla-releng/staging-firefox-android"));
    }
}
