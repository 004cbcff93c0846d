//! Configuration types for the SOAP gateway agent.
//!
//! Keys are camelCase, matching the configuration object the proxy host
//! delivers at startup.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// Main configuration for the SOAP gateway agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Static HTTP options used when no endpoint URL is configured
    pub http_options: Option<HttpOptions>,

    /// Target type name accepted by the dispatcher
    pub service_type: String,

    /// Invocable operations, keyed by name
    pub operations: HashMap<String, OperationConfig>,

    /// Schema type descriptors
    pub types: Vec<TypeDescriptor>,

    /// SOAP endpoint URL; overrides `http_options` when it parses
    pub endpoint: Option<String>,

    /// Basic auth user
    pub username: Option<String>,

    /// Basic auth password
    pub password: Option<String>,
}

impl GatewayConfig {
    /// Parse a configuration document (YAML or JSON).
    pub fn parse(content: &str) -> Result<Self, GatewayError> {
        serde_yaml::from_str(content).map_err(|e| GatewayError::Config(e.to_string()))
    }

    /// Read and parse a configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }
}

/// HTTP request options handed to the SOAP transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpOptions {
    pub protocol: Option<String>,
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub method: Option<String>,
    pub headers: HashMap<String, String>,
    /// `user:password`
    pub auth: Option<String>,
}

/// Parse an endpoint URL into HTTP options.
///
/// Returns `None` for anything that is not an absolute `http`/`https` URL
/// with a host.
pub fn parse_endpoint(endpoint: &str) -> Option<HttpOptions> {
    let url = Url::parse(endpoint.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let hostname = url.host_str()?.to_string();

    let mut path = url.path().to_string();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }

    Some(HttpOptions {
        protocol: Some(format!("{}:", url.scheme())),
        hostname: Some(hostname),
        port: url.port_or_known_default(),
        path: Some(path),
        ..Default::default()
    })
}

/// Where the per-call HTTP options come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointState {
    /// Options are usable (possibly empty when nothing was configured)
    Valid(HttpOptions),
    /// The configured endpoint URL did not parse; every call fails
    Invalid(String),
}

impl EndpointState {
    /// Resolve the endpoint state from configuration.
    pub fn resolve(config: &GatewayConfig) -> Self {
        let mut options = config.http_options.clone();

        if let Some(ref endpoint) = config.endpoint {
            match parse_endpoint(endpoint) {
                Some(mut parsed) => {
                    parsed.method = Some("POST".to_string());
                    options = Some(parsed);
                }
                None => return Self::Invalid(endpoint.clone()),
            }
        }

        if let (Some(options), Some(username)) = (options.as_mut(), config.username.as_deref()) {
            options.auth = Some(format!(
                "{}:{}",
                username,
                config.password.as_deref().unwrap_or_default()
            ));
        }
        Self::Valid(options.unwrap_or_default())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// One invocable SOAP operation as configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperationConfig {
    /// Flat parameter name -> metadata
    pub input_params: Option<HashMap<String, InputParam>>,
    pub request_desc: Option<MessageDescriptor>,
    pub response_desc: Option<MessageDescriptor>,
    /// Passed through to the transport untouched
    pub deserialization_options: Option<Value>,
}

/// Metadata for one flat input parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputParam {
    /// Group the parameter is nested under in the SOAP message
    pub parent_name: Option<String>,
}

/// Shape of one SOAP message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessageDescriptor {
    pub soap_action: Option<String>,
    pub parts: Option<Vec<MessagePart>>,
}

/// One named part of a SOAP message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessagePart {
    pub name: String,
    pub xml_type: Option<String>,
    pub xml_type_ns: Option<String>,
}

/// One schema type as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypeDescriptor {
    /// Qualified name (see [`crate::schema::make_qname`])
    pub full_name: String,
    pub base_type_name: Option<String>,
    pub base_type_ns: Option<String>,
    pub content: Vec<ContentMember>,
}

/// One named field of a composite type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentMember {
    pub name: String,
    pub xml_type: Option<String>,
    pub xml_type_ns: Option<String>,
}
