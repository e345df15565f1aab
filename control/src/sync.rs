//! One-shot ingress sync
//!
//! enumerate -> render -> dispatch, one ingress at a time. A failure for one
//! ingress is logged and the run moves on; only enumeration failures end the
//! run early.

use crate::apis::ingress::enumerator::{enumerate_ingresses, Enumeration};
use crate::apis::ingress::ingress::IngressKey;
use crate::apis::ingress::source::IngressSource;
use crate::config::SyncConfig;
use crate::dispatch::{ConfigSink, DispatchOutcome};
use crate::error::SyncError;
use crate::nginx::{NginxConfig, RenderSettings};
use crate::snapshot::IngressSnapshot;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{error, info};

/// Per-run counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// CREATE records answered with 2xx
    pub applied: usize,
    /// Records answered with a non-2xx status
    pub rejected: usize,
    /// Records that could not be delivered
    pub failed: usize,
    /// DELETE records delivered (any status)
    pub deleted: usize,
    pub skipped_namespaces: usize,
}

impl SyncReport {
    fn record(&mut self, outcome: &Result<DispatchOutcome, SyncError>) {
        match outcome {
            Ok(DispatchOutcome::Applied(_)) => self.applied += 1,
            Ok(DispatchOutcome::Rejected(_)) => self.rejected += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Run one sync pass
pub async fn run_once<S, D>(
    source: &S,
    sink: &D,
    config: &SyncConfig,
) -> Result<SyncReport, SyncError>
where
    S: IngressSource + ?Sized,
    D: ConfigSink + ?Sized,
{
    let enumeration = enumerate_ingresses(source, config.enumeration).await?;
    let settings = RenderSettings::from(config);
    let mut report = SyncReport {
        skipped_namespaces: enumeration.skipped_namespaces.len(),
        ..Default::default()
    };

    for record in &enumeration.ingresses {
        let conf = NginxConfig::create(record, &settings);
        let outcome = sink.send(&conf).await;
        if let Err(e) = &outcome {
            error!(
                ingress = %record.name,
                namespace = record.namespace.as_deref().unwrap_or(""),
                error = %e,
                "Error sending nginx config"
            );
        }
        report.record(&outcome);
    }

    if let Some(path) = &config.snapshot_path {
        send_deletions(sink, path, &enumeration, &mut report).await;
    }

    Ok(report)
}

/// Deletion pass against the previous run's snapshot
///
/// Snapshot failures are logged and never fail the run. An unreadable
/// snapshot skips the pass and is replaced by the current set.
async fn send_deletions<D>(
    sink: &D,
    path: &Path,
    enumeration: &Enumeration,
    report: &mut SyncReport,
) where
    D: ConfigSink + ?Sized,
{
    let current: BTreeSet<IngressKey> = enumeration.ingresses.iter().map(|r| r.key()).collect();
    let mut next = current.clone();

    match IngressSnapshot::load(path).await {
        Ok(previous) => {
            next.extend(previous.carried_over(&enumeration.skipped_namespaces));

            for key in previous.deleted_since(&current, &enumeration.skipped_namespaces) {
                info!(ingress = %key, "Ingress no longer present, sending DELETE");
                let conf = NginxConfig::delete(&key);
                match sink.send(&conf).await {
                    Ok(_) => report.deleted += 1,
                    Err(e) => {
                        error!(
                            ingress = %key,
                            error = %e,
                            "Error sending DELETE, will retry next run"
                        );
                        report.failed += 1;
                        next.insert(key);
                    }
                }
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to load ingress snapshot, skipping deletion pass");
        }
    }

    if let Err(e) = (IngressSnapshot { ingresses: next }).save(path).await {
        error!(error = %e, "Failed to save ingress snapshot");
    }
}
