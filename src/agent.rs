//! Main SOAP gateway agent implementation.
//!
//! Matches inbound directives against the configured service, reshapes their
//! parameters and hands them to the [`SoapInvoker`].

use crate::config::GatewayConfig;
use crate::context::ServiceContext;
use crate::error::GatewayError;
use crate::invoker::{RestResponse, SoapInvoker};
use crate::reshape::reshape;
use crate::transport::SoapTransport;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// The only directive kind the gateway handles.
pub const INVOKE_OP: &str = "INVOKE";

/// One inbound request from the proxy host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Directive {
    /// Directive kind
    pub op: String,
    /// Target service type
    pub target_type: String,
    /// Operation name
    pub name: String,
    /// Flat parameters
    pub params: Map<String, Value>,
}

impl Directive {
    /// Build an `INVOKE` directive.
    pub fn invoke(target_type: impl Into<String>, name: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            op: INVOKE_OP.to_string(),
            target_type: target_type.into(),
            name: name.into(),
            params,
        }
    }
}

/// Outcome of one directive.
pub type DirectiveResult = Result<RestResponse, GatewayError>;

/// Host-facing seam: the proxy host delivers directives through this.
#[async_trait]
pub trait DirectiveHandler: Send + Sync {
    /// Handle one directive. Resolves exactly once.
    async fn on_directive(&self, directive: Directive) -> DirectiveResult;
}

/// Counter snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GatewayStats {
    pub directives_processed: u64,
    pub directives_rejected: u64,
    pub invocations_failed: u64,
}

/// REST-to-SOAP gateway agent.
pub struct SoapGateway {
    context: Arc<ServiceContext>,
    invoker: SoapInvoker,
    directives_processed: AtomicU64,
    directives_rejected: AtomicU64,
    invocations_failed: AtomicU64,
}

impl SoapGateway {
    /// Initialize the gateway from configuration.
    pub fn new(config: GatewayConfig, transport: Arc<dyn SoapTransport>) -> Self {
        Self::with_context(Arc::new(ServiceContext::new(config)), transport)
    }

    /// Create a gateway over an already initialized context.
    pub fn with_context(context: Arc<ServiceContext>, transport: Arc<dyn SoapTransport>) -> Self {
        let invoker = SoapInvoker::new(context.clone(), transport);
        Self {
            context,
            invoker,
            directives_processed: AtomicU64::new(0),
            directives_rejected: AtomicU64::new(0),
            invocations_failed: AtomicU64::new(0),
        }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.context
    }

    /// Process a directive and return the response envelope.
    pub async fn process_directive(&self, directive: Directive) -> DirectiveResult {
        self.directives_processed.fetch_add(1, Ordering::Relaxed);

        let operation = if directive.op == INVOKE_OP && directive.target_type == self.context.service_type {
            self.context.operations.get(&directive.name)
        } else {
            None
        };

        let Some(operation) = operation else {
            self.directives_rejected.fetch_add(1, Ordering::Relaxed);
            debug!(
                op = %directive.op,
                target_type = %directive.target_type,
                name = %directive.name,
                "Unsupported directive"
            );
            return Err(GatewayError::UnsupportedRequest);
        };

        let input = reshape(&directive.params, operation.input_params.as_ref());

        match self.invoker.invoke(input, operation).await {
            Ok(response) => Ok(response),
            Err(err) => {
                self.invocations_failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    operation = %operation.name,
                    code = %err.code().as_str(),
                    error = %err,
                    "SOAP invocation failed"
                );
                Err(err)
            }
        }
    }

    /// Process a directive and deliver the outcome on `reply`.
    ///
    /// The sender is consumed, so the outcome is delivered at most once, and
    /// every path sends, so it is delivered exactly once. A dropped receiver
    /// is logged and otherwise ignored.
    pub async fn dispatch(&self, directive: Directive, reply: oneshot::Sender<DirectiveResult>) {
        let name = directive.name.clone();
        let outcome = self.process_directive(directive).await;
        if reply.send(outcome).is_err() {
            info!(name = %name, "Directive caller went away before the reply");
        }
    }

    /// Current counters.
    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            directives_processed: self.directives_processed.load(Ordering::Relaxed),
            directives_rejected: self.directives_rejected.load(Ordering::Relaxed),
            invocations_failed: self.invocations_failed.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl DirectiveHandler for SoapGateway {
    async fn on_directive(&self, directive: Directive) -> DirectiveResult {
        self.process_directive(directive).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InputParam, MessageDescriptor, OperationConfig, TypeDescriptor};
    use crate::error::TransportError;
    use crate::transport::SoapCall;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const SERVICE: &str = "WidgetService";

    struct RecordingTransport {
        calls: Mutex<Vec<SoapCall>>,
        reply: Result<Value, TransportError>,
    }

    impl RecordingTransport {
        fn new(reply: Result<Value, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                reply,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_input(&self) -> Value {
            let calls = self.calls.lock().unwrap();
            Value::Object(calls.last().unwrap().input.clone())
        }
    }

    #[async_trait]
    impl SoapTransport for RecordingTransport {
        async fn call(&self, call: SoapCall) -> Result<Value, TransportError> {
            self.calls.lock().unwrap().push(call);
            self.reply.clone()
        }
    }

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            service_type: SERVICE.to_string(),
            types: vec![TypeDescriptor {
                full_name: "ns:Widget".to_string(),
                content: vec![crate::config::ContentMember {
                    name: "id".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            operations: HashMap::from([(
                "GetWidget".to_string(),
                OperationConfig {
                    input_params: Some(HashMap::from([(
                        "serial".to_string(),
                        InputParam {
                            parent_name: Some("request".to_string()),
                        },
                    )])),
                    request_desc: Some(MessageDescriptor {
                        soap_action: Some("urn:GetWidget".to_string()),
                        parts: None,
                    }),
                    ..Default::default()
                },
            )]),
            ..Default::default()
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    // --- Dispatch ---

    #[tokio::test]
    async fn test_invoke_reshapes_parameters() {
        let transport = RecordingTransport::new(Ok(json!({"id": "w-1"})));
        let gateway = SoapGateway::new(test_config(), transport.clone());

        let directive = Directive::invoke(SERVICE, "GetWidget", params(json!({"serial": "abc123"})));
        let response = gateway.process_directive(directive).await.unwrap();

        assert_eq!(transport.call_count(), 1);
        assert_eq!(transport.last_input(), json!({"request": {"serial": "abc123"}}));
        assert_eq!(response.count, 1);
        assert_eq!(response.results, vec![json!({"id": "w-1"})]);
    }

    #[tokio::test]
    async fn test_wrong_op_is_unsupported() {
        let transport = RecordingTransport::new(Ok(json!({})));
        let gateway = SoapGateway::new(test_config(), transport.clone());

        let mut directive = Directive::invoke(SERVICE, "GetWidget", Map::new());
        directive.op = "SELECT".to_string();

        let err = gateway.process_directive(directive).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedRequest));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_target_type_is_unsupported() {
        let transport = RecordingTransport::new(Ok(json!({})));
        let gateway = SoapGateway::new(test_config(), transport.clone());

        let directive = Directive::invoke("OtherService", "GetWidget", Map::new());
        let err = gateway.process_directive(directive).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedRequest));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_operation_is_unsupported() {
        let transport = RecordingTransport::new(Ok(json!({})));
        let gateway = SoapGateway::new(test_config(), transport.clone());

        let directive = Directive::invoke(SERVICE, "DeleteWidget", Map::new());
        let err = gateway.process_directive(directive).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedRequest));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_gateway_survives_errors() {
        let transport = RecordingTransport::new(Ok(json!([1, 2])));
        let gateway = SoapGateway::new(test_config(), transport.clone());

        let bad = Directive::invoke(SERVICE, "Nope", Map::new());
        assert!(gateway.process_directive(bad).await.is_err());

        let good = Directive::invoke(SERVICE, "GetWidget", Map::new());
        let response = gateway.process_directive(good).await.unwrap();
        assert_eq!(response.count, 2);
    }

    // --- Single-completion reply ---

    #[tokio::test]
    async fn test_dispatch_replies_once_on_success() {
        let transport = RecordingTransport::new(Ok(json!({"id": 1})));
        let gateway = SoapGateway::new(test_config(), transport);

        let (tx, rx) = oneshot::channel();
        gateway
            .dispatch(Directive::invoke(SERVICE, "GetWidget", Map::new()), tx)
            .await;

        let response = rx.await.unwrap().unwrap();
        assert_eq!(response.status, "SUCCESS");
    }

    #[tokio::test]
    async fn test_dispatch_replies_once_on_rejection() {
        let transport = RecordingTransport::new(Ok(json!({})));
        let gateway = SoapGateway::new(test_config(), transport.clone());

        let (tx, rx) = oneshot::channel();
        gateway
            .dispatch(Directive::invoke("Elsewhere", "GetWidget", Map::new()), tx)
            .await;

        assert!(matches!(rx.await.unwrap(), Err(GatewayError::UnsupportedRequest)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_tolerates_dropped_receiver() {
        let transport = RecordingTransport::new(Ok(json!({})));
        let gateway = SoapGateway::new(test_config(), transport.clone());

        let (tx, rx) = oneshot::channel();
        drop(rx);
        gateway
            .dispatch(Directive::invoke(SERVICE, "GetWidget", Map::new()), tx)
            .await;
        assert_eq!(transport.call_count(), 1);
    }

    // --- Host seam and stats ---

    #[tokio::test]
    async fn test_directive_handler_delegates() {
        let transport = RecordingTransport::new(Ok(json!({})));
        let gateway = SoapGateway::new(test_config(), transport);
        let handler: &dyn DirectiveHandler = &gateway;

        let response = handler
            .on_directive(Directive::invoke(SERVICE, "GetWidget", Map::new()))
            .await
            .unwrap();
        assert_eq!(response.count, 1);
    }

    #[tokio::test]
    async fn test_stats_counters() {
        let transport = RecordingTransport::new(Err(TransportError::Network("refused".to_string())));
        let gateway = SoapGateway::new(test_config(), transport);

        let _ = gateway
            .process_directive(Directive::invoke(SERVICE, "GetWidget", Map::new()))
            .await;
        let _ = gateway
            .process_directive(Directive::invoke(SERVICE, "Nope", Map::new()))
            .await;

        assert_eq!(
            gateway.stats(),
            GatewayStats {
                directives_processed: 2,
                directives_rejected: 1,
                invocations_failed: 1,
            }
        );
    }

    #[test]
    fn test_directive_deserialization() {
        let directive: Directive = serde_json::from_value(json!({
            "op": "INVOKE",
            "targetType": SERVICE,
            "name": "GetWidget",
            "params": {"serial": "abc123"}
        }))
        .unwrap();
        assert_eq!(
            directive,
            Directive::invoke(SERVICE, "GetWidget", params(json!({"serial": "abc123"})))
        );
    }
}
