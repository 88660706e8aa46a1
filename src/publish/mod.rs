//! Release publishing layer
//!
//! # Modules
//!
//! - [`processor`]: Runs one release through manifest update, install, copy and publish
//! - [`package_manager`]: Install/publish capability and the npm implementation
//! - [`workspace`]: Manifest, declaration file and marker persistence
//! - [`manifest`]: Order-preserving package.json rewriting
//! - [`marker`]: Last-published record
//! - [`channel`]: Distribution channel selection
//! - [`error`]: Per-release and state errors

pub mod channel;
pub mod error;
pub mod manifest;
pub mod marker;
pub mod package_manager;
pub mod processor;
pub mod workspace;
