use thiserror::Error;

/// Ingress sync errors
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(String),

    #[error("Kubernetes error: {0}")]
    Kubernetes(#[from] kube::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid applier endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Snapshot error at {path}: {source}")]
    Snapshot {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
