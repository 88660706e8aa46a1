//! Republish an upstream package's type declarations whenever it releases.
//!
//! - [`version`]: discovers which upstream releases are newer than the marker
//! - [`publish`]: turns one release into a published package
//! - [`runner`]: ties both together for a single run
//! - [`config`]: file-based configuration and defaults

pub mod config;
pub mod publish;
pub mod runner;
pub mod version;
