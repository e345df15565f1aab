//! nginx config rendering
//!
//! Turns one ingress record into a `server { ... }` block where every
//! location proxies to the plugin hub and carries the original backend in
//! request headers.

use crate::apis::ingress::ingress::{IngressKey, IngressRecord, PathRecord, RuleRecord};
use crate::config::{PluginHubConfig, SyncConfig};
use serde::{Deserialize, Serialize};

/// `server_name` used when the first rule has no host (nginx catch-all)
pub const FALLBACK_SERVER_NAME: &str = "_";

/// `Host` header value for rules without a host: pass the client's Host
pub const FALLBACK_HOST_HEADER: &str = "$host";

/// Location used for path entries without a path
pub const FALLBACK_LOCATION: &str = "/";

/// Event reported to the config applier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Create,
    Delete,
}

/// Payload posted to the config applier
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NginxConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub ingress: String,
    pub type_event: EventType,
    pub config: String,
}

impl NginxConfig {
    /// CREATE record with the rendered server block
    pub fn create(record: &IngressRecord, settings: &RenderSettings) -> Self {
        Self {
            namespace: record.namespace.clone(),
            ingress: record.name.clone(),
            type_event: EventType::Create,
            config: render_server_block(record, settings),
        }
    }

    /// DELETE record; carries identity only, never a config body
    pub fn delete(key: &IngressKey) -> Self {
        Self {
            namespace: key.namespace.clone(),
            ingress: key.name.clone(),
            type_event: EventType::Delete,
            config: String::new(),
        }
    }

    pub fn key(&self) -> IngressKey {
        IngressKey {
            namespace: self.namespace.clone(),
            name: self.ingress.clone(),
        }
    }
}

/// Renderer inputs taken from `SyncConfig`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub listen_port: u16,
    pub plugin_hub: PluginHubConfig,
    pub plugins_annotation: String,
}

impl From<&SyncConfig> for RenderSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            listen_port: config.listen_port,
            plugin_hub: config.plugin_hub.clone(),
            plugins_annotation: config.plugins_annotation.clone(),
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

/// Render the server block for one ingress
///
/// Output is a pure function of the record and settings. Rules are emitted
/// in record order and paths in rule order; rules without an `http` section
/// contribute nothing.
pub fn render_server_block(record: &IngressRecord, settings: &RenderSettings) -> String {
    let mut out = String::new();
    let server_name = record.primary_host().unwrap_or(FALLBACK_SERVER_NAME);
    let plugins = record.annotation(&settings.plugins_annotation).unwrap_or("");

    out.push_str("server {\n");
    out.push_str(&format!("   listen {};\n", settings.listen_port));
    out.push_str(&format!("  server_name {};\n", server_name));

    for rule in &record.rules {
        let Some(paths) = &rule.paths else {
            continue;
        };
        for path in paths {
            render_location(&mut out, rule, path, plugins, &settings.plugin_hub);
        }
    }

    out.push_str("}\n");
    out
}

fn render_location(
    out: &mut String,
    rule: &RuleRecord,
    path: &PathRecord,
    plugins: &str,
    hub: &PluginHubConfig,
) {
    let location = path
        .path
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(FALLBACK_LOCATION);
    let host = rule
        .host
        .as_deref()
        .filter(|h| !h.is_empty())
        .unwrap_or(FALLBACK_HOST_HEADER);
    let service_name = path.service_name.as_deref().unwrap_or("");
    let service_port = path
        .service_port
        .as_ref()
        .map(|port| port.to_string())
        .unwrap_or_default();

    out.push_str(&format!("  location {} {{\n", location));
    out.push_str(&format!("    proxy_pass http://{}:{};\n", hub.service_name, hub.port));
    out.push_str(&format!("    proxy_set_header ServiceName {};\n", service_name));
    out.push_str(&format!("    proxy_set_header ServicePort {};\n", service_port));
    out.push_str(&format!("    proxy_set_header Host {};\n", host));
    out.push_str(&format!("    proxy_set_header Plugins {};\n", plugins));
    out.push_str("  }\n");
}
