//! SOAP Gateway Agent for Zentinel
//!
//! Translates generic REST-style `INVOKE` directives into SOAP requests
//! against a configured web service, and normalizes the responses into a
//! uniform result envelope.
//!
//! # Features
//!
//! - Type registry with resolved base types and member types
//! - Operation binding of request/response message parts to schema types
//! - Directive dispatch by service type and operation name
//! - Flat-to-nested parameter reshaping
//! - SOAPAction header injection on per-call HTTP options
//! - Uniform `{status, count, results}` response envelope
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use zentinel_agent_soap_gateway::{Directive, GatewayConfig, LoopbackTransport, SoapGateway};
//!
//! let gateway = SoapGateway::new(config, Arc::new(LoopbackTransport));
//! let response = gateway
//!     .process_directive(Directive::invoke("WidgetService", "GetWidget", params))
//!     .await?;
//! ```

pub mod agent;
pub mod binder;
pub mod config;
pub mod context;
pub mod error;
pub mod invoker;
pub mod reshape;
pub mod schema;
pub mod transport;

pub use agent::{Directive, DirectiveHandler, SoapGateway};
pub use config::GatewayConfig;
pub use error::{ErrorCode, GatewayError, TransportError};
pub use invoker::RestResponse;
pub use transport::{LoopbackTransport, SoapCall, SoapTransport};
