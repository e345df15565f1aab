//! sidra ingress sync
//!
//! Renders Kubernetes Ingress resources into nginx server blocks that proxy
//! through the plugin hub, and posts them to the local config applier.

pub mod apis;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod nginx;
pub mod snapshot;
pub mod sync;

pub use config::SyncConfig;
pub use error::SyncError;
