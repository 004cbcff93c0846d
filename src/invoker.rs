//! SOAP invocation and response normalization.

use crate::binder::BoundOperation;
use crate::config::EndpointState;
use crate::context::ServiceContext;
use crate::error::GatewayError;
use crate::transport::{SoapCall, SoapTransport};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Header carrying the SOAP action.
pub const SOAP_ACTION_HEADER: &str = "SOAPAction";

/// Uniform success envelope returned to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestResponse {
    /// Always `"SUCCESS"`
    pub status: String,
    pub count: usize,
    pub results: Vec<Value>,
}

impl RestResponse {
    /// Wrap a transport result, normalized to a sequence.
    pub fn success(result: Value) -> Self {
        let results = normalize_results(result);
        Self {
            status: "SUCCESS".to_string(),
            count: results.len(),
            results,
        }
    }
}

/// Turn a transport result into a sequence.
///
/// Arrays pass through unchanged, `null` becomes empty, and any other value
/// becomes a single-element sequence.
pub fn normalize_results(result: Value) -> Vec<Value> {
    match result {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Calls the SOAP transport for bound operations.
#[derive(Clone)]
pub struct SoapInvoker {
    context: Arc<ServiceContext>,
    transport: Arc<dyn SoapTransport>,
}

impl SoapInvoker {
    pub fn new(context: Arc<ServiceContext>, transport: Arc<dyn SoapTransport>) -> Self {
        Self { context, transport }
    }

    /// Invoke `operation` with already reshaped `input`.
    ///
    /// Fails without touching the transport when the endpoint is invalid.
    /// Transport errors are returned unchanged.
    pub async fn invoke(
        &self,
        input: Map<String, Value>,
        operation: &BoundOperation,
    ) -> Result<RestResponse, GatewayError> {
        let shared_options = match self.context.endpoint {
            EndpointState::Valid(ref options) => options,
            EndpointState::Invalid(ref endpoint) => {
                warn!(
                    operation = %operation.name,
                    endpoint = %endpoint,
                    "Refusing to invoke operation with invalid endpoint"
                );
                return Err(GatewayError::InvalidEndpointConfiguration {
                    endpoint: endpoint.clone(),
                });
            }
        };

        // Each call gets its own copy; concurrent calls never see each
        // other's headers.
        let mut http_options = shared_options.clone();
        if let Some(ref request) = operation.request {
            http_options
                .headers
                .retain(|name, _| !name.eq_ignore_ascii_case(SOAP_ACTION_HEADER));
            http_options.headers.insert(
                SOAP_ACTION_HEADER.to_string(),
                request.soap_action.clone().unwrap_or_default(),
            );
        }

        debug!(
            operation = %operation.name,
            soap_action = ?operation.request.as_ref().and_then(|r| r.soap_action.as_deref()),
            "Invoking SOAP operation"
        );

        let call = SoapCall {
            input,
            http_options,
            request: operation.request.clone(),
            deserialization_options: operation.deserialization_options.clone(),
            response: operation.response.clone(),
            types: self.context.types.clone(),
        };

        let result = self.transport.call(call).await?;
        let response = RestResponse::success(result);

        debug!(
            operation = %operation.name,
            count = response.count,
            "SOAP operation completed"
        );

        Ok(response)
    }
}
