//! Cluster access for Ingress listing

use crate::error::SyncError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, ResourceExt};
use std::path::Path;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

/// Listing operations the enumerator needs from the cluster
///
/// Lets the sync loop run against a fake cluster in tests while production
/// uses `KubeIngressSource`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IngressSource: Send + Sync {
    /// List ingresses across all namespaces
    async fn list_all_ingresses(&self) -> Result<Vec<Ingress>, SyncError>;

    /// List namespace names
    async fn list_namespaces(&self) -> Result<Vec<String>, SyncError>;

    /// List ingresses in one namespace
    async fn list_namespaced_ingresses(&self, namespace: &str) -> Result<Vec<Ingress>, SyncError>;
}

/// `IngressSource` backed by the Kubernetes API
pub struct KubeIngressSource {
    client: Client,
}

impl KubeIngressSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IngressSource for KubeIngressSource {
    async fn list_all_ingresses(&self) -> Result<Vec<Ingress>, SyncError> {
        let api: Api<Ingress> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;

        debug!("Discovered {} ingress(es) cluster-wide", list.items.len());
        Ok(list.items)
    }

    async fn list_namespaces(&self) -> Result<Vec<String>, SyncError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;

        Ok(list.items.iter().map(|ns| ns.name_any()).collect())
    }

    async fn list_namespaced_ingresses(&self, namespace: &str) -> Result<Vec<Ingress>, SyncError> {
        let api: Api<Ingress> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default()).await?;

        debug!(
            "Discovered {} ingress(es) in namespace '{}'",
            list.items.len(),
            namespace
        );
        Ok(list.items)
    }
}

/// Build a Kubernetes client
///
/// Uses the given kubeconfig file when set, otherwise kube's inference chain
/// (`KUBECONFIG`, `~/.kube/config`, in-cluster service account).
pub async fn connect(kubeconfig: Option<&Path>) -> Result<Client, SyncError> {
    let config = match kubeconfig {
        Some(path) => {
            info!("Loading kubeconfig from {}", path.display());
            let kubeconfig = Kubeconfig::read_from(path)
                .map_err(|e| SyncError::Kubeconfig(format!("{}: {}", path.display(), e)))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| SyncError::Kubeconfig(format!("{}: {}", path.display(), e)))?
        }
        None => Config::infer()
            .await
            .map_err(|e| SyncError::Kubeconfig(e.to_string()))?,
    };

    info!("Connecting to Kubernetes API at {}", config.cluster_url);
    Ok(Client::try_from(config)?)
}
