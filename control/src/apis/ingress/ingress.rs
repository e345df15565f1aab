//! Ingress records
//!
//! Read-only view of a networking.k8s.io/v1 Ingress holding only what the
//! nginx renderer consumes: rules, paths, backend service and annotations.

use k8s_openapi::api::networking::v1::{HTTPIngressPath, Ingress, IngressRule};
use kube::ResourceExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of an ingress across runs
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct IngressKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
}

impl fmt::Display for IngressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// One ingress as seen by the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressRecord {
    pub name: String,
    pub namespace: Option<String>,
    /// Rules in cluster API order
    pub rules: Vec<RuleRecord>,
    pub annotations: BTreeMap<String, String>,
}

/// Host rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRecord {
    pub host: Option<String>,
    /// `None` when the rule carries no `http` section
    pub paths: Option<Vec<PathRecord>>,
}

/// HTTP path entry and the backend it originally pointed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRecord {
    pub path: Option<String>,
    /// Unset for resource backends
    pub service_name: Option<String>,
    pub service_port: Option<BackendPort>,
}

/// Service port reference (number or named port)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendPort {
    Number(i32),
    Name(String),
}

impl fmt::Display for BackendPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendPort::Number(n) => write!(f, "{}", n),
            BackendPort::Name(name) => write!(f, "{}", name),
        }
    }
}

impl IngressRecord {
    pub fn key(&self) -> IngressKey {
        IngressKey {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    /// Annotation value, if present
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// Host of the first rule, if there is one and it is set
    pub fn primary_host(&self) -> Option<&str> {
        self.rules
            .first()
            .and_then(|rule| rule.host.as_deref())
            .filter(|host| !host.is_empty())
    }
}

impl From<&Ingress> for IngressRecord {
    fn from(ingress: &Ingress) -> Self {
        let rules = ingress
            .spec
            .as_ref()
            .and_then(|spec| spec.rules.as_ref())
            .map(|rules| rules.iter().map(RuleRecord::from).collect())
            .unwrap_or_default();

        Self {
            name: ingress.name_any(),
            namespace: ingress.namespace(),
            rules,
            annotations: ingress.annotations().clone(),
        }
    }
}

impl From<&IngressRule> for RuleRecord {
    fn from(rule: &IngressRule) -> Self {
        Self {
            host: rule.host.clone(),
            paths: rule
                .http
                .as_ref()
                .map(|http| http.paths.iter().map(PathRecord::from).collect()),
        }
    }
}

impl From<&HTTPIngressPath> for PathRecord {
    fn from(path: &HTTPIngressPath) -> Self {
        let service = path.backend.service.as_ref();

        // Number wins when both are set; the API server rejects that anyway
        let service_port = service
            .and_then(|svc| svc.port.as_ref())
            .and_then(|port| match (port.number, &port.name) {
                (Some(number), _) => Some(BackendPort::Number(number)),
                (None, Some(name)) => Some(BackendPort::Name(name.clone())),
                (None, None) => None,
            });

        Self {
            path: path.path.clone(),
            service_name: service.map(|svc| svc.name.clone()),
            service_port,
        }
    }
}
