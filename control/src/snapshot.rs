//! Ingress snapshot
//!
//! Records which ingresses a run saw so the next run can report the ones
//! that disappeared as DELETE events.

use crate::apis::ingress::ingress::IngressKey;
use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io;
use std::path::Path;
use tracing::debug;

/// Ingress keys seen by one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct IngressSnapshot {
    pub ingresses: BTreeSet<IngressKey>,
}

impl IngressSnapshot {
    pub fn new(ingresses: impl IntoIterator<Item = IngressKey>) -> Self {
        Self {
            ingresses: ingresses.into_iter().collect(),
        }
    }

    /// Load a snapshot; a missing file is an empty snapshot
    pub async fn load(path: &Path) -> Result<Self, SyncError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No snapshot at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(snapshot_error(path, e)),
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| snapshot_error(path, io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    /// Write the snapshot through a temp file and rename
    pub async fn save(&self, path: &Path) -> Result<(), SyncError> {
        let payload = serde_json::to_vec_pretty(self)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");

        tokio::fs::write(&tmp, payload)
            .await
            .map_err(|e| snapshot_error(path, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| snapshot_error(path, e))?;

        debug!(
            "Saved snapshot of {} ingress(es) to {}",
            self.ingresses.len(),
            path.display()
        );
        Ok(())
    }

    /// Keys present here but absent from `current`, excluding keys in
    /// namespaces that could not be listed this run
    pub fn deleted_since(
        &self,
        current: &BTreeSet<IngressKey>,
        skipped_namespaces: &BTreeSet<String>,
    ) -> Vec<IngressKey> {
        self.ingresses
            .iter()
            .filter(|key| !current.contains(*key))
            .filter(|key| !in_skipped_namespace(key, skipped_namespaces))
            .cloned()
            .collect()
    }

    /// Keys in namespaces that could not be listed this run
    pub fn carried_over(&self, skipped_namespaces: &BTreeSet<String>) -> Vec<IngressKey> {
        self.ingresses
            .iter()
            .filter(|key| in_skipped_namespace(key, skipped_namespaces))
            .cloned()
            .collect()
    }
}

fn in_skipped_namespace(key: &IngressKey, skipped_namespaces: &BTreeSet<String>) -> bool {
    key.namespace
        .as_ref()
        .is_some_and(|ns| skipped_namespaces.contains(ns))
}

fn snapshot_error(path: &Path, source: io::Error) -> SyncError {
    SyncError::Snapshot {
        path: path.display().to_string(),
        source,
    }
}
