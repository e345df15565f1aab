//! Ingress enumeration
//!
//! Collects every Ingress in the cluster, either with one cluster-wide list
//! or by walking namespaces. A failing namespace is skipped and reported;
//! top-level listing failures are returned to the caller.

use crate::apis::ingress::ingress::IngressRecord;
use crate::apis::ingress::source::IngressSource;
use crate::config::EnumerationStrategy;
use crate::error::SyncError;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Result of one enumeration pass
#[derive(Debug, Default)]
pub struct Enumeration {
    /// Records in cluster API order
    pub ingresses: Vec<IngressRecord>,
    /// Namespaces whose listing failed during a namespace walk
    pub skipped_namespaces: BTreeSet<String>,
}

/// Enumerate ingresses with the given strategy
pub async fn enumerate_ingresses<S>(
    source: &S,
    strategy: EnumerationStrategy,
) -> Result<Enumeration, SyncError>
where
    S: IngressSource + ?Sized,
{
    let enumeration = match strategy {
        EnumerationStrategy::ClusterWide => {
            let items = source.list_all_ingresses().await?;
            Enumeration {
                ingresses: items.iter().map(IngressRecord::from).collect(),
                skipped_namespaces: BTreeSet::new(),
            }
        }
        EnumerationStrategy::PerNamespace => walk_namespaces(source).await?,
    };

    info!(
        strategy = ?strategy,
        ingresses = enumeration.ingresses.len(),
        skipped_namespaces = enumeration.skipped_namespaces.len(),
        "Ingress enumeration complete"
    );

    Ok(enumeration)
}

async fn walk_namespaces<S>(source: &S) -> Result<Enumeration, SyncError>
where
    S: IngressSource + ?Sized,
{
    let namespaces = source.list_namespaces().await?;
    let mut enumeration = Enumeration::default();

    for namespace in namespaces {
        match source.list_namespaced_ingresses(&namespace).await {
            Ok(items) => {
                enumeration
                    .ingresses
                    .extend(items.iter().map(IngressRecord::from));
            }
            Err(e) => {
                warn!(
                    namespace = %namespace,
                    error = %e,
                    "Failed to list ingresses, skipping namespace"
                );
                enumeration.skipped_namespaces.insert(namespace);
            }
        }
    }

    Ok(enumeration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::ingress::source::MockIngressSource;
    use k8s_openapi::api::networking::v1::Ingress;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use mockall::predicate::eq;

    fn ingress(namespace: &str, name: &str) -> Ingress {
        Ingress {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn api_error(code: u16, reason: &str) -> SyncError {
        SyncError::Kubernetes(kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{} from API server", reason),
            reason: reason.to_string(),
            code,
        }))
    }

    fn names(enumeration: &Enumeration) -> Vec<String> {
        enumeration
            .ingresses
            .iter()
            .map(|r| r.key().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_cluster_wide_uses_single_list() {
        let mut source = MockIngressSource::new();
        source
            .expect_list_all_ingresses()
            .times(1)
            .returning(|| Ok(vec![ingress("store", "shop"), ingress("blog", "web")]));
        source.expect_list_namespaces().never();
        source.expect_list_namespaced_ingresses().never();

        let enumeration = enumerate_ingresses(&source, EnumerationStrategy::ClusterWide)
            .await
            .expect("Should enumerate");

        assert_eq!(names(&enumeration), vec!["store/shop", "blog/web"]);
        assert!(enumeration.skipped_namespaces.is_empty());
    }

    #[tokio::test]
    async fn test_cluster_wide_failure_is_fatal() {
        let mut source = MockIngressSource::new();
        source
            .expect_list_all_ingresses()
            .returning(|| Err(api_error(503, "ServiceUnavailable")));

        let result = enumerate_ingresses(&source, EnumerationStrategy::ClusterWide).await;
        assert!(result.is_err(), "Top-level listing failure should propagate");
    }

    #[tokio::test]
    async fn test_namespace_walk_preserves_order() {
        let mut source = MockIngressSource::new();
        source
            .expect_list_namespaces()
            .returning(|| Ok(vec!["a".to_string(), "b".to_string()]));
        source
            .expect_list_namespaced_ingresses()
            .with(eq("a"))
            .returning(|_| Ok(vec![ingress("a", "one"), ingress("a", "two")]));
        source
            .expect_list_namespaced_ingresses()
            .with(eq("b"))
            .returning(|_| Ok(vec![ingress("b", "three")]));

        let enumeration = enumerate_ingresses(&source, EnumerationStrategy::PerNamespace)
            .await
            .expect("Should enumerate");

        assert_eq!(names(&enumeration), vec!["a/one", "a/two", "b/three"]);
    }

    #[tokio::test]
    async fn test_namespace_walk_skips_failing_namespace() {
        let mut source = MockIngressSource::new();
        source.expect_list_namespaces().returning(|| {
            Ok(vec![
                "a".to_string(),
                "forbidden".to_string(),
                "c".to_string(),
            ])
        });
        source
            .expect_list_namespaced_ingresses()
            .with(eq("forbidden"))
            .returning(|_| Err(api_error(403, "Forbidden")));
        source
            .expect_list_namespaced_ingresses()
            .with(eq("a"))
            .returning(|ns| Ok(vec![ingress(ns, "app")]));
        source
            .expect_list_namespaced_ingresses()
            .with(eq("c"))
            .returning(|ns| Ok(vec![ingress(ns, "app")]));

        let enumeration = enumerate_ingresses(&source, EnumerationStrategy::PerNamespace)
            .await
            .expect("Per-namespace failure should not be fatal");

        assert_eq!(names(&enumeration), vec!["a/app", "c/app"]);
        assert!(enumeration.skipped_namespaces.contains("forbidden"));
        assert_eq!(enumeration.skipped_namespaces.len(), 1);
    }

    #[tokio::test]
    async fn test_namespace_list_failure_is_fatal() {
        let mut source = MockIngressSource::new();
        source
            .expect_list_namespaces()
            .returning(|| Err(api_error(401, "Unauthorized")));
        source.expect_list_namespaced_ingresses().never();

        let result = enumerate_ingresses(&source, EnumerationStrategy::PerNamespace).await;
        assert!(result.is_err());
    }
}
