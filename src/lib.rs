//! Client for the release-management service behind the release console.
//!
//! [`ShipitClient`] wraps the REST API: release listings and submission,
//! phase scheduling and sign-offs, and product enablement. [`partials`]
//! holds the rules for suggesting and resolving partial updates, and
//! [`products`] the catalog of releasable products and branches.

pub mod auth;
pub mod client;
pub mod commands;
pub mod config;
pub mod consts;
pub mod error;
pub mod partials;
pub mod products;
pub mod render;
pub mod taskcluster;
pub mod types;
pub mod vcs;
pub mod version;

pub use client::{ClientConfig, ReleaseKind, ShipitClient};
pub use error::{ShipitError, ShipitResult};
pub use products::ProductCatalog;
