//! Ingress support (networking.k8s.io/v1)
//!
//! - ingress: read-only Ingress records for the renderer
//! - source: cluster listing behind the `IngressSource` trait
//! - enumerator: cluster-wide or per-namespace enumeration

pub mod enumerator;
#[allow(clippy::module_inception)]
pub mod ingress;
pub mod source;
