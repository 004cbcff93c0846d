//! Service context built once at startup.

use crate::binder::{bind, OperationSet};
use crate::config::{EndpointState, GatewayConfig};
use crate::schema::TypeRegistry;
use std::sync::Arc;
use tracing::{info, warn};

/// Process-wide state shared by every in-flight directive.
///
/// Construction resolves the endpoint, builds the type registry and binds the
/// operations, in that order. Nothing is mutated afterwards, so the context
/// is shared behind an `Arc` without locking.
#[derive(Debug)]
pub struct ServiceContext {
    pub service_type: String,
    pub endpoint: EndpointState,
    /// Shared with the transport so it can resolve part types
    pub types: Arc<TypeRegistry>,
    pub operations: OperationSet,
}

impl ServiceContext {
    pub fn new(config: GatewayConfig) -> Self {
        let endpoint = EndpointState::resolve(&config);
        if let EndpointState::Invalid(ref url) = endpoint {
            warn!(endpoint = %url, "Unable to parse the SOAP endpoint URL");
            warn!("The proxy will be unable to communicate with the target service");
            warn!("Please supply a correctly formatted URL");
        }

        let types = Arc::new(TypeRegistry::build(config.types));
        let operations = bind(config.operations, &types);

        info!(
            service_type = %config.service_type,
            operations = operations.len(),
            types = types.len(),
            endpoint_valid = endpoint.is_valid(),
            "Service context initialized"
        );

        Self {
            service_type: config.service_type,
            endpoint,
            types,
            operations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MessageDescriptor, MessagePart, OperationConfig, TypeDescriptor};
    use crate::schema::make_qname;
    use std::collections::HashMap;

    #[test]
    fn test_context_binds_against_registry() {
        let config = GatewayConfig {
            service_type: "WidgetService".to_string(),
            types: vec![TypeDescriptor {
                full_name: make_qname(Some("urn:w"), "Req"),
                ..Default::default()
            }],
            operations: HashMap::from([(
                "Get".to_string(),
                OperationConfig {
                    request_desc: Some(MessageDescriptor {
                        soap_action: Some("urn:Get".to_string()),
                        parts: Some(vec![MessagePart {
                            name: "req".to_string(),
                            xml_type: Some("Req".to_string()),
                            xml_type_ns: Some("urn:w".to_string()),
                        }]),
                    }),
                    ..Default::default()
                },
            )]),
            ..Default::default()
        };

        let context = ServiceContext::new(config);
        let part_type = context.operations.get("Get").unwrap().request.as_ref().unwrap().parts.as_ref().unwrap()[0].type_id;
        assert_eq!(part_type, context.types.lookup(Some("urn:w"), "Req"));
        assert!(context.endpoint.is_valid());
        assert_eq!(context.service_type, "WidgetService");
    }

    #[test]
    fn test_context_records_invalid_endpoint() {
        let context = ServiceContext::new(GatewayConfig {
            endpoint: Some("definitely not a url".to_string()),
            ..Default::default()
        });
        assert_eq!(
            context.endpoint,
            EndpointState::Invalid("definitely not a url".to_string())
        );
    }
}
