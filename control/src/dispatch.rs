//! Config applier delivery
//!
//! Posts rendered configs as JSON to the local config applier. One attempt
//! per record: no timeout, no retry. Non-2xx responses are logged and
//! reported as `Rejected`, only transport failures are errors.

use crate::error::SyncError;
use crate::nginx::NginxConfig;
use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use tracing::{info, warn};

#[cfg(test)]
use mockall::automock;

/// Result of a delivered record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Applier answered 2xx
    Applied(StatusCode),
    /// Applier answered with any other status; still counts as sent
    Rejected(StatusCode),
}

/// Destination for rendered configs
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConfigSink: Send + Sync {
    async fn send(&self, config: &NginxConfig) -> Result<DispatchOutcome, SyncError>;
}

/// `ConfigSink` posting to the config applier over HTTP/1.1
pub struct HttpDispatcher {
    endpoint: Uri,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpDispatcher {
    pub fn new(applier_url: &str) -> Result<Self, SyncError> {
        let endpoint = applier_url
            .parse::<Uri>()
            .map_err(|e| SyncError::InvalidEndpoint {
                url: applier_url.to_string(),
                reason: e.to_string(),
            })?;

        if endpoint.scheme_str() != Some("http") || endpoint.authority().is_none() {
            return Err(SyncError::InvalidEndpoint {
                url: applier_url.to_string(),
                reason: "expected an absolute http:// URL".to_string(),
            });
        }

        let client = Client::builder(TokioExecutor::new()).build_http();

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }
}

#[async_trait]
impl ConfigSink for HttpDispatcher {
    async fn send(&self, config: &NginxConfig) -> Result<DispatchOutcome, SyncError> {
        let payload = serde_json::to_vec(config)?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(payload)))
            .map_err(|e| SyncError::Dispatch(format!("Failed to build request: {}", e)))?;

        let response = self.client.request(request).await.map_err(|e| {
            SyncError::Dispatch(format!("POST {} failed: {}", self.endpoint, e))
        })?;

        let status = response.status();
        if status.is_success() {
            info!(
                ingress = %config.ingress,
                namespace = config.namespace.as_deref().unwrap_or(""),
                event = ?config.type_event,
                status = status.as_u16(),
                "Sent nginx config"
            );
            Ok(DispatchOutcome::Applied(status))
        } else {
            warn!(
                ingress = %config.ingress,
                namespace = config.namespace.as_deref().unwrap_or(""),
                event = ?config.type_event,
                status = status.as_u16(),
                "Config applier returned non-success status"
            );
            Ok(DispatchOutcome::Rejected(status))
        }
    }
}
