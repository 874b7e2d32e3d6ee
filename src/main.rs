use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use shipit::auth::AuthStorage;
use shipit::client::{ReleaseKind, ShipitClient};
use shipit::commands::{self, Session};
use shipit::config::{Overrides, Resolved, Settings};
use shipit::consts::{DEFAULT_RECENT_LIMIT, TOKEN_ENV_VAR, default_db_path};
use shipit::error::ShipitError;
use shipit::vcs::HttpLocaleSource;

#[derive(Parser)]
#[command(name = "shipit", author, version, about = "Drive releases through the release-management API.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database for settings and tokens (use :memory: for ephemeral)
    #[arg(long, env = "SHIPIT_DB", global = true)]
    db: Option<String>,

    /// Private API base URL
    #[arg(long, env = "SHIPIT_API_URL", global = true)]
    api_url: Option<String>,

    /// Public (read-only) API base URL
    #[arg(long, env = "SHIPIT_PUBLIC_API_URL", global = true)]
    public_api_url: Option<String>,

    /// Taskcluster deployment used for task states
    #[arg(long, env = "TASKCLUSTER_ROOT_URL", global = true)]
    taskcluster_root_url: Option<String>,

    /// Treeherder base URL
    #[arg(long, env = "SHIPIT_TREEHERDER_URL", global = true)]
    treeherder_url: Option<String>,

    /// JSON product catalog replacing the built-in one
    #[arg(long, env = "SHIPIT_PRODUCTS_FILE", global = true)]
    products_file: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Log level (error, warn, info, debug, trace); SHIPIT_LOG or RUST_LOG win
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// List, inspect and create releases
    #[command(subcommand)]
    Releases(ReleasesCommand),
    /// Schedule or sign off release phases
    #[command(subcommand)]
    Phase(PhaseCommand),
    /// Inspect the catalog and toggle product branches
    #[command(subcommand)]
    Products(ProductsCommand),
    /// Browser extension releases
    #[command(subcommand)]
    Xpi(XpiCommand),
    /// Manage the bearer token for the private API
    #[command(subcommand)]
    Token(TokenCommand),
    /// Manage stored settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
struct ProductBranchArgs {
    #[arg(long)]
    product: String,
    #[arg(long)]
    branch: String,
}

#[derive(Subcommand)]
enum ReleasesCommand {
    /// Releases in flight with phase, task and sign-off state
    Pending,
    /// Newest shipped releases of every catalog branch
    Recent {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
    /// Shipped releases of one product branch
    Shipped {
        #[command(flatten)]
        target: ProductBranchArgs,
        #[arg(long)]
        version: Option<String>,
        #[arg(long)]
        build_number: Option<u32>,
    },
    /// Build numbers already used for a version
    BuildNumbers {
        #[command(flatten)]
        target: ProductBranchArgs,
        #[arg(long)]
        version: String,
    },
    /// Next free build number for a version
    NextBuild {
        #[command(flatten)]
        target: ProductBranchArgs,
        #[arg(long)]
        version: String,
    },
    /// Suggested partial versions for a new release
    Partials {
        #[command(flatten)]
        target: ProductBranchArgs,
        #[arg(long)]
        version: String,
    },
    /// Create a release
    Submit {
        #[command(flatten)]
        target: ProductBranchArgs,
        #[arg(long)]
        revision: String,
        #[arg(long)]
        version: String,
        /// Defaults to the next free build number
        #[arg(long)]
        build_number: Option<u32>,
        /// Comma-separated `<version>build<n>` list
        #[arg(long, conflicts_with = "guess_partials")]
        partials: Option<String>,
        /// Use the suggested partials
        #[arg(long, default_value_t = false)]
        guess_partials: bool,
        /// Planned release time, RFC 3339
        #[arg(long)]
        eta: Option<DateTime<Utc>>,
    },
    /// Cancel a release
    Cancel {
        name: String,
        #[arg(long, default_value_t = false)]
        xpi: bool,
    },
}

#[derive(Subcommand)]
enum PhaseCommand {
    /// Trigger a phase
    Schedule {
        release: String,
        phase: String,
        #[arg(long, default_value_t = false)]
        xpi: bool,
    },
    /// Sign off a phase
    Signoff {
        release: String,
        phase: String,
        /// Sign-off UID
        uid: String,
        #[arg(long, default_value_t = false)]
        xpi: bool,
    },
}

#[derive(Subcommand)]
enum ProductsCommand {
    /// Catalog with enablement state
    List,
    /// Disabled product branches
    Disabled,
    /// Block new releases of a product branch
    Disable(ProductBranchArgs),
    /// Allow new releases of a product branch again
    Enable(ProductBranchArgs),
    /// Treeherder link for a push
    Treeherder {
        #[arg(long)]
        project: String,
        #[arg(long)]
        revision: String,
        /// Open the link in a browser
        #[arg(long, default_value_t = false)]
        open: bool,
    },
}

#[derive(Subcommand)]
enum XpiCommand {
    /// Newest shipped XPI releases
    Recent {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
    /// XPI releases in flight
    Pending,
    /// Build numbers already used for an XPI version
    BuildNumbers {
        #[arg(long)]
        xpi_name: String,
        #[arg(long)]
        xpi_version: String,
    },
    /// Create an XPI release
    Submit {
        /// Revision of the XPI manifest repository
        #[arg(long)]
        manifest_revision: String,
        #[arg(long)]
        xpi_revision: String,
        #[arg(long)]
        xpi_name: String,
        #[arg(long)]
        xpi_version: String,
        #[arg(long)]
        build_number: Option<u32>,
    },
}

#[derive(Subcommand)]
enum TokenCommand {
    /// Store a token (read from stdin when omitted)
    Set {
        token: Option<String>,
        #[arg(long)]
        expires_in_hours: Option<i64>,
    },
    /// Remove the stored token
    Clear,
    /// Show where the token comes from
    Status,
}

#[derive(Subcommand)]
enum ConfigCommand {
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
    List,
}

fn kind(xpi: bool) -> ReleaseKind {
    if xpi { ReleaseKind::Xpi } else { ReleaseKind::Gecko }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env("SHIPIT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(format!("shipit={level}")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_session(cli: &Cli) -> anyhow::Result<Session> {
    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => {
            let path = default_db_path();
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            path.to_string_lossy().into_owned()
        }
    };

    let settings = Settings::open(&db_path)?;
    let resolved = Resolved::resolve(
        &settings,
        Overrides {
            api_url: cli.api_url.clone(),
            public_api_url: cli.public_api_url.clone(),
            taskcluster_root_url: cli.taskcluster_root_url.clone(),
            treeherder_url: cli.treeherder_url.clone(),
            products_file: cli.products_file.clone(),
        },
    )?;

    let token = AuthStorage::open(&db_path)?.resolve(&resolved.api_url, TOKEN_ENV_VAR)?;
    debug!(api_url = %resolved.api_url, authenticated = token.is_some(), "session ready");

    let client = ShipitClient::with_locale_source(
        resolved.client_config(token),
        Arc::new(HttpLocaleSource::new()?),
    )?;
    let catalog = resolved.catalog()?;

    Ok(Session {
        client,
        catalog,
        settings: resolved,
        db_path,
        json: cli.json,
    })
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let session = open_session(&cli)?;
    let s = &session;

    match cli.command {
        Command::Releases(cmd) => match cmd {
            ReleasesCommand::Pending => commands::releases::pending(s).await,
            ReleasesCommand::Recent { limit } => commands::releases::recent(s, limit).await,
            ReleasesCommand::Shipped {
                target,
                version,
                build_number,
            } => {
                commands::releases::shipped(
                    s,
                    &target.product,
                    &target.branch,
                    version.as_deref(),
                    build_number,
                )
                .await
            }
            ReleasesCommand::BuildNumbers { target, version } => {
                commands::releases::build_numbers(s, &target.product, &target.branch, &version)
                    .await
            }
            ReleasesCommand::NextBuild { target, version } => {
                commands::releases::next_build(s, &target.product, &target.branch, &version).await
            }
            ReleasesCommand::Partials { target, version } => {
                commands::releases::partials(s, &target.product, &target.branch, &version).await
            }
            ReleasesCommand::Submit {
                target,
                revision,
                version,
                build_number,
                partials,
                guess_partials,
                eta,
            } => {
                commands::releases::submit(
                    s,
                    commands::releases::SubmitArgs {
                        product: target.product,
                        branch: target.branch,
                        revision,
                        version,
                        build_number,
                        partials,
                        guess_partials,
                        release_eta: eta,
                    },
                )
                .await
            }
            ReleasesCommand::Cancel { name, xpi } => {
                commands::releases::cancel(s, kind(xpi), &name).await
            }
        },
        Command::Phase(cmd) => match cmd {
            PhaseCommand::Schedule {
                release,
                phase,
                xpi,
            } => commands::phase::schedule(s, kind(xpi), &release, &phase).await,
            PhaseCommand::Signoff {
                release,
                phase,
                uid,
                xpi,
            } => commands::phase::signoff(s, kind(xpi), &release, &phase, &uid).await,
        },
        Command::Products(cmd) => match cmd {
            ProductsCommand::List => commands::products::list(s).await,
            ProductsCommand::Disabled => commands::products::disabled(s).await,
            ProductsCommand::Disable(t) => {
                commands::products::disable(s, &t.product, &t.branch).await
            }
            ProductsCommand::Enable(t) => commands::products::enable(s, &t.product, &t.branch).await,
            ProductsCommand::Treeherder {
                project,
                revision,
                open,
            } => commands::products::treeherder(s, &project, &revision, open),
        },
        Command::Xpi(cmd) => match cmd {
            XpiCommand::Recent { limit } => commands::xpi::recent(s, limit).await,
            XpiCommand::Pending => commands::xpi::pending(s).await,
            XpiCommand::BuildNumbers {
                xpi_name,
                xpi_version,
            } => commands::xpi::build_numbers(s, &xpi_name, &xpi_version).await,
            XpiCommand::Submit {
                manifest_revision,
                xpi_revision,
                xpi_name,
                xpi_version,
                build_number,
            } => {
                commands::xpi::submit(
                    s,
                    commands::xpi::SubmitArgs {
                        manifest_revision,
                        xpi_revision,
                        xpi_name,
                        xpi_version,
                        build_number,
                    },
                )
                .await
            }
        },
        Command::Token(cmd) => match cmd {
            TokenCommand::Set {
                token,
                expires_in_hours,
            } => commands::token::set(s, token, expires_in_hours),
            TokenCommand::Clear => commands::token::clear(s),
            TokenCommand::Status => commands::token::status(s),
        },
        Command::Config(cmd) => match cmd {
            ConfigCommand::Get { key } => commands::config::get(s, &key),
            ConfigCommand::Set { key, value } => commands::config::set(s, &key, &value),
            ConfigCommand::Unset { key } => commands::config::unset(s, &key),
            ConfigCommand::List => commands::config::list(s),
        },
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        let code = e
            .downcast_ref::<ShipitError>()
            .map_or(1, ShipitError::exit_code);
        std::process::exit(code);
    }
}
