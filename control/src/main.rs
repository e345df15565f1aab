use anyhow::{Context, Result};
use sidra_control::apis::ingress::source::{connect, KubeIngressSource};
use sidra_control::dispatch::HttpDispatcher;
use sidra_control::sync::run_once;
use sidra_control::SyncConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Ingress sync: one pass over the cluster, then exit
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (needed for Kubernetes TLS client)
    rustls::crypto::ring::default_provider()
        .install_default()
        .ok(); // Ignore error if already installed

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = SyncConfig::from_env().context("Failed to load configuration")?;

    info!(
        applier = %config.applier_url,
        plugin_hub = %format!("{}:{}", config.plugin_hub.service_name, config.plugin_hub.port),
        enumeration = ?config.enumeration,
        "Starting ingress sync"
    );

    let dispatcher =
        HttpDispatcher::new(&config.applier_url).context("Invalid config applier URL")?;

    let client = connect(config.kubeconfig.as_deref())
        .await
        .context("Failed to create Kubernetes client")?;
    let source = KubeIngressSource::new(client);

    let report = run_once(&source, &dispatcher, &config)
        .await
        .context("Ingress sync failed")?;

    info!(
        applied = report.applied,
        rejected = report.rejected,
        failed = report.failed,
        deleted = report.deleted,
        skipped_namespaces = report.skipped_namespaces,
        "Ingress sync finished"
    );

    Ok(())
}
