//! Version discovery layer
//!
//! Fetches the upstream release listing and decides which releases still
//! need to be republished.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registries │────▶│  Resolver   │────▶│  Candidates │
//! │ (npm fetch) │     │  (filter)   │     │ (ascending) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │   Semver    │
//!                     │ (ordering)  │
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`registry`]: Registry trait for fetching versions from remote sources
//! - [`registries`]: Concrete registry implementations (npm)
//! - [`resolver`]: Filters and orders the listing against the marker
//! - [`semver`]: Parsing and the pre-release ordering policy
//! - [`error`]: Error types for registry and parsing failures
//! - [`types`]: Common types like `PackageVersions`

pub mod error;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod semver;
pub mod types;
