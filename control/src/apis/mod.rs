//! Kubernetes API integrations
//!
//! This module contains the Ingress listing used by the sync run.

pub mod ingress;
