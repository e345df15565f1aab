//! Configuration for the ingress sync
//!
//! Every field has a default matching the fixed values the config applier
//! expects, so a run with no environment set behaves identically to the
//! hard-wired deployment.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Sync configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Service every generated location block proxies to
    #[serde(default)]
    pub plugin_hub: PluginHubConfig,

    /// Annotation key holding the comma-delimited plugin list
    #[serde(default = "default_plugins_annotation")]
    pub plugins_annotation: String,

    /// Port in the generated `listen` directive
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Config applier endpoint receiving the rendered configs
    #[serde(default = "default_applier_url")]
    pub applier_url: String,

    /// How ingresses are listed from the cluster
    #[serde(default)]
    pub enumeration: EnumerationStrategy,

    /// Previous-run snapshot used for deletion detection (disabled when unset)
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Explicit kubeconfig path (falls back to kube's inference when unset)
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
}

/// Plugin hub target
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PluginHubConfig {
    #[serde(default = "default_plugin_hub_service")]
    pub service_name: String,

    #[serde(default = "default_plugin_hub_port")]
    pub port: u16,
}

/// Ingress enumeration strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum EnumerationStrategy {
    /// Single list call across all namespaces
    #[default]
    #[serde(rename = "cluster")]
    ClusterWide,
    /// List namespaces, then list ingresses in each one
    #[serde(rename = "namespaces")]
    PerNamespace,
}

impl FromStr for EnumerationStrategy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cluster" | "all" => Ok(Self::ClusterWide),
            "namespaces" | "per-namespace" => Ok(Self::PerNamespace),
            other => Err(SyncError::Config(format!(
                "unknown enumeration strategy '{}' (expected 'cluster' or 'namespaces')",
                other
            ))),
        }
    }
}

fn default_plugin_hub_service() -> String {
    "satpam-service-app".to_string()
}

fn default_plugin_hub_port() -> u16 {
    8080
}

fn default_plugins_annotation() -> String {
    "sidra.id/plugins".to_string()
}

fn default_listen_port() -> u16 {
    8080
}

fn default_applier_url() -> String {
    "http://localhost:3033/api/v1/nginx/conf".to_string()
}

impl Default for PluginHubConfig {
    fn default() -> Self {
        Self {
            service_name: default_plugin_hub_service(),
            port: default_plugin_hub_port(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            plugin_hub: PluginHubConfig::default(),
            plugins_annotation: default_plugins_annotation(),
            listen_port: default_listen_port(),
            applier_url: default_applier_url(),
            enumeration: EnumerationStrategy::default(),
            snapshot_path: None,
            kubeconfig: None,
        }
    }
}

impl SyncConfig {
    /// Load configuration from `SIDRA_*` environment variables
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("SIDRA_PLUGIN_HUB_SERVICE") {
            config.plugin_hub.service_name = val;
        }

        if let Some(val) = lookup("SIDRA_PLUGIN_HUB_PORT") {
            config.plugin_hub.port = parse_port("SIDRA_PLUGIN_HUB_PORT", &val)?;
        }

        if let Some(val) = lookup("SIDRA_PLUGINS_ANNOTATION") {
            config.plugins_annotation = val;
        }

        if let Some(val) = lookup("SIDRA_LISTEN_PORT") {
            config.listen_port = parse_port("SIDRA_LISTEN_PORT", &val)?;
        }

        if let Some(val) = lookup("SIDRA_APPLIER_URL") {
            config.applier_url = val;
        }

        if let Some(val) = lookup("SIDRA_ENUMERATION") {
            config.enumeration = val.parse()?;
        }

        // Empty values count as unset so a blank env entry cannot point at ""
        config.snapshot_path = lookup("SIDRA_SNAPSHOT_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        config.kubeconfig = lookup("SIDRA_KUBECONFIG")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16, SyncError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|e| SyncError::Config(format!("invalid {} '{}': {}", key, value, e)))
}
