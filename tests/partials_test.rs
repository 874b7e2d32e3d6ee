//! Partial-update resolution and suggestion against a mocked API.

use std::sync::Arc;

use serde_json::json;
use shipit::client::{ClientConfig, ShipitClient};
use shipit::error::ShipitError;
use shipit::partials::{generate_partial_updates, guess_partial_versions};
use shipit::products::{Branch, Product, VersionPattern};
use shipit::vcs::MockLocales;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RELEASE: &str = "releases/mozilla-release";
const BETA: &str = "releases/mozilla-beta";
const ESR: &str = "releases/mozilla-esr68";
const RELEASE_REPO: &str = "https://hg.mozilla.org/releases/mozilla-release";
const BETA_REPO: &str = "https://hg.mozilla.org/releases/mozilla-beta";
const ESR_REPO: &str = "https://hg.mozilla.org/releases/mozilla-esr68";

fn firefox() -> Product {
    Product {
        product: "firefox".to_string(),
        app_name: "browser".to_string(),
        enable_partials: true,
        ..Product::default()
    }
}

fn release_branch() -> Branch {
    Branch {
        branch: RELEASE.to_string(),
        repo: Some(RELEASE_REPO.to_string()),
        rc_branch: Some(BETA.to_string()),
        rc_repo: Some(BETA_REPO.to_string()),
        rc_branch_version_pattern: Some(VersionPattern::new("b").unwrap()),
        alternative_branch: Some(ESR.to_string()),
        alternative_repo: Some(ESR_REPO.to_string()),
        number_of_partials: Some(3),
        ..Branch::default()
    }
}

fn client(server: &MockServer, locales: Arc<MockLocales>) -> ShipitClient {
    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_token("test-token")
        .with_max_retries(0);
    ShipitClient::with_locale_source(config, locales).expect("failed to create client")
}

fn shipped(branch: &str, version: &str, build_number: u32, revision: &str) -> serde_json::Value {
    json!({
        "name": format!("Firefox-{version}-build{build_number}"),
        "product": "firefox",
        "branch": branch,
        "version": version,
        "build_number": build_number,
        "revision": revision,
        "status": "shipped",
    })
}

async fn mount_listing(server: &MockServer, branch: &str, releases: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/releases"))
        .and(query_param("branch", branch))
        .and(query_param("status", "shipped"))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases))
        .mount(server)
        .await;
}

// ── generate_partial_updates ──────────────────────────────────────

#[tokio::test]
async fn rc_partials_come_from_the_rc_branch() {
    let server = MockServer::start().await;
    mount_listing(&server, BETA, json!([shipped(BETA, "70.0b14", 1, "beta-rev")])).await;

    let locales = Arc::new(MockLocales::new().with(BETA_REPO, "beta-rev", &["de", "fr"]));
    let client = client(&server, locales.clone());

    let updates = generate_partial_updates(
        &client,
        &firefox(),
        &release_branch(),
        "70.0",
        &["70.0b14build1".to_string()],
    )
    .await
    .expect("partials failed");

    let update = &updates["70.0b14"];
    assert_eq!(update.build_number, 1);
    assert_eq!(update.locales, ["de", "fr"]);
    assert_eq!(
        locales.calls(),
        vec![(
            BETA_REPO.to_string(),
            "beta-rev".to_string(),
            "browser".to_string()
        )]
    );
}

#[tokio::test]
async fn non_rc_versions_stay_on_their_branch() {
    let server = MockServer::start().await;
    mount_listing(&server, RELEASE, json!([shipped(RELEASE, "69.0", 2, "rel-rev")])).await;
    Mock::given(method("GET"))
        .and(query_param("branch", BETA))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let locales = Arc::new(MockLocales::new().with(RELEASE_REPO, "rel-rev", &["en-US"]));
    let updates = generate_partial_updates(
        &client(&server, locales),
        &firefox(),
        &release_branch(),
        "70.0.1",
        &["69.0build2".to_string()],
    )
    .await
    .unwrap();

    assert_eq!(updates["69.0"].locales, ["en-US"]);
}

#[tokio::test]
async fn missing_partials_fall_back_to_the_alternative_branch() {
    let server = MockServer::start().await;
    mount_listing(&server, RELEASE, json!([])).await;
    mount_listing(&server, ESR, json!([shipped(ESR, "68.2.0esr", 1, "esr-rev")])).await;

    let locales = Arc::new(MockLocales::new().with(ESR_REPO, "esr-rev", &["it", "ja"]));
    let updates = generate_partial_updates(
        &client(&server, locales.clone()),
        &firefox(),
        &release_branch(),
        "70.0.1",
        &["68.2.0esrbuild1".to_string()],
    )
    .await
    .unwrap();

    assert_eq!(updates["68.2.0esr"].locales, ["it", "ja"]);
    assert_eq!(locales.calls()[0].0, ESR_REPO);
}

#[tokio::test]
async fn ambiguous_partials_are_rejected() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        RELEASE,
        json!([
            shipped(RELEASE, "69.0", 1, "a"),
            shipped(RELEASE, "69.0", 1, "b"),
        ]),
    )
    .await;

    let err = generate_partial_updates(
        &client(&server, Arc::new(MockLocales::new())),
        &firefox(),
        &release_branch(),
        "70.0.1",
        &["69.0build1".to_string()],
    )
    .await
    .unwrap_err();

    match err {
        ShipitError::PartialLookup {
            branch,
            version,
            build_number,
            ..
        } => {
            assert_eq!(branch, RELEASE);
            assert_eq!(version, "69.0");
            assert_eq!(build_number, 1);
        }
        other => panic!("expected PartialLookup, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_partials_name_the_last_branch_tried() {
    let server = MockServer::start().await;
    mount_listing(&server, RELEASE, json!([])).await;
    mount_listing(&server, ESR, json!([])).await;

    let err = generate_partial_updates(
        &client(&server, Arc::new(MockLocales::new())),
        &firefox(),
        &release_branch(),
        "70.0.1",
        &["1.0build1".to_string()],
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("Cannot obtain proper information for firefox {ESR} 1.0 build 1")
    );
}

#[tokio::test]
async fn malformed_partial_ids_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = generate_partial_updates(
        &client(&server, Arc::new(MockLocales::new())),
        &firefox(),
        &release_branch(),
        "70.0",
        &["69.0".to_string()],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ShipitError::InvalidBuildId { .. }), "got {err:?}");
}

// ── guess_partial_versions ────────────────────────────────────────

#[tokio::test]
async fn guesses_branch_then_rc_then_alternative() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        RELEASE,
        json!([
            shipped(RELEASE, "68.0", 1, "a"),
            shipped(RELEASE, "69.0", 3, "b"),
        ]),
    )
    .await;
    mount_listing(
        &server,
        BETA,
        json!([
            shipped(BETA, "70.0b13", 1, "c"),
            shipped(BETA, "70.0b14", 1, "d"),
        ]),
    )
    .await;
    mount_listing(
        &server,
        ESR,
        json!([
            shipped(ESR, "68.1.0esr", 1, "e"),
            shipped(ESR, "68.2.0esr", 1, "f"),
        ]),
    )
    .await;

    let guessed = guess_partial_versions(
        &client(&server, Arc::new(MockLocales::new())),
        &firefox(),
        &release_branch(),
        "70.0",
    )
    .await
    .unwrap();

    assert_eq!(
        guessed,
        ["69.0build3", "68.0build1", "70.0b14build1", "68.2.0esrbuild1"]
    );
}

#[tokio::test]
async fn full_branch_skips_alternative_and_rc_for_dot_releases() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        RELEASE,
        json!([
            shipped(RELEASE, "67.0", 1, "a"),
            shipped(RELEASE, "68.0", 1, "b"),
            shipped(RELEASE, "69.0", 1, "c"),
            shipped(RELEASE, "69.0.1", 1, "d"),
        ]),
    )
    .await;
    for branch in [BETA, ESR] {
        Mock::given(method("GET"))
            .and(query_param("branch", branch))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;
    }

    let guessed = guess_partial_versions(
        &client(&server, Arc::new(MockLocales::new())),
        &firefox(),
        &release_branch(),
        "69.0.2",
    )
    .await
    .unwrap();

    assert_eq!(guessed, ["69.0.1build1", "69.0build1", "68.0build1"]);
}

#[tokio::test]
async fn zero_partials_means_the_default_count() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "try",
        json!([
            shipped("try", "1.0", 1, "a"),
            shipped("try", "2.0", 1, "b"),
            shipped("try", "3.0", 1, "c"),
            shipped("try", "4.0", 1, "d"),
        ]),
    )
    .await;

    let branch = Branch {
        branch: "try".to_string(),
        number_of_partials: Some(0),
        ..Branch::default()
    };
    let guessed = guess_partial_versions(
        &client(&server, Arc::new(MockLocales::new())),
        &firefox(),
        &branch,
        "5.0",
    )
    .await
    .unwrap();

    assert_eq!(guessed, ["4.0build1", "3.0build1", "2.0build1"]);
}

#[tokio::test]
async fn empty_rc_branch_is_skipped() {
    let server = MockServer::start().await;
    mount_listing(&server, RELEASE, json!([shipped(RELEASE, "69.0", 1, "a")])).await;
    mount_listing(&server, BETA, json!([])).await;
    mount_listing(&server, ESR, json!([])).await;

    let guessed = guess_partial_versions(
        &client(&server, Arc::new(MockLocales::new())),
        &firefox(),
        &release_branch(),
        "70.0",
    )
    .await
    .unwrap();

    assert_eq!(guessed, ["69.0build1"]);
}
