//! SOAP transport boundary.
//!
//! The gateway never builds XML or talks HTTP itself. It prepares a
//! [`SoapCall`] with fully resolved descriptors and hands it to a
//! [`SoapTransport`].

use crate::binder::{BoundMessage, BoundPart};
use crate::config::HttpOptions;
use crate::error::TransportError;
use crate::schema::{SchemaType, TypeRegistry};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Everything the transport needs for one SOAP call.
#[derive(Debug, Clone)]
pub struct SoapCall {
    /// Reshaped input parameters
    pub input: Map<String, Value>,
    /// Per-call HTTP options (carries the `SOAPAction` header)
    pub http_options: HttpOptions,
    pub request: Option<BoundMessage>,
    pub deserialization_options: Option<Value>,
    pub response: Option<BoundMessage>,
    /// Registry the part and member type ids point into
    pub types: Arc<TypeRegistry>,
}

impl SoapCall {
    /// Resolved schema type of a request or response part.
    pub fn part_type(&self, part: &BoundPart) -> Option<&SchemaType> {
        part.type_id.and_then(|id| self.types.type_of(id))
    }
}

/// Performs the SOAP exchange.
///
/// Implementations must resolve exactly once per call; a transport that
/// never resolves leaves the request pending, since the gateway applies
/// no timeout of its own.
#[async_trait]
pub trait SoapTransport: Send + Sync {
    /// Send the request and decode the response into a value or sequence.
    async fn call(&self, call: SoapCall) -> Result<Value, TransportError>;
}

/// Transport that performs no I/O and echoes the prepared call.
///
/// Useful for checking what a directive turns into without a live service.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackTransport;

#[async_trait]
impl SoapTransport for LoopbackTransport {
    async fn call(&self, call: SoapCall) -> Result<Value, TransportError> {
        let http_options = serde_json::to_value(&call.http_options)
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        let describe_parts = |message: &Option<BoundMessage>| -> Vec<Value> {
            message
                .as_ref()
                .and_then(|m| m.parts.as_ref())
                .map(|parts| {
                    parts
                        .iter()
                        .map(|part| {
                            json!({
                                "name": part.name,
                                "type": call.part_type(part).map(|t| t.full_name.clone()),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        let request_parts = describe_parts(&call.request);
        let response_parts = describe_parts(&call.response);

        Ok(json!({
            "input": call.input,
            "httpOptions": http_options,
            "soapAction": call.request.as_ref().and_then(|r| r.soap_action.clone()),
            "requestParts": request_parts,
            "responseParts": response_parts,
            "deserializationOptions": call.deserialization_options,
        }))
    }
}
