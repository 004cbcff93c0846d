//! Operation binding.
//!
//! Resolves the XML type reference on every request and response message
//! part against the [`TypeRegistry`]. Must run after the registry is fully
//! built.

use crate::config::{InputParam, MessageDescriptor, MessagePart, OperationConfig};
use crate::schema::{TypeId, TypeRegistry};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// A message part with its resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundPart {
    pub name: String,
    pub xml_type: Option<String>,
    pub xml_type_ns: Option<String>,
    /// Resolved part type (absent when untyped or unmatched)
    pub type_id: Option<TypeId>,
}

/// A message descriptor with resolved part types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundMessage {
    pub soap_action: Option<String>,
    pub parts: Option<Vec<BoundPart>>,
}

/// An operation ready to be invoked.
#[derive(Debug, Clone)]
pub struct BoundOperation {
    pub name: String,
    pub input_params: Option<HashMap<String, InputParam>>,
    pub request: Option<BoundMessage>,
    pub response: Option<BoundMessage>,
    pub deserialization_options: Option<Value>,
}

/// All bound operations, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct OperationSet {
    operations: HashMap<String, BoundOperation>,
}

impl OperationSet {
    pub fn get(&self, name: &str) -> Option<&BoundOperation> {
        self.operations.get(name)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Operation names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Bind every configured operation against the registry.
pub fn bind(operations: HashMap<String, OperationConfig>, registry: &TypeRegistry) -> OperationSet {
    let mut unresolved = 0usize;

    let operations = operations
        .into_iter()
        .map(|(name, config)| {
            let request = config
                .request_desc
                .map(|desc| bind_message(desc, registry, &mut unresolved));
            let response = config
                .response_desc
                .map(|desc| bind_message(desc, registry, &mut unresolved));

            let bound = BoundOperation {
                name: name.clone(),
                input_params: config.input_params,
                request,
                response,
                deserialization_options: config.deserialization_options,
            };
            (name, bound)
        })
        .collect::<HashMap<_, _>>();

    debug!(
        operations = operations.len(),
        unresolved_part_types = unresolved,
        "Operations bound"
    );

    OperationSet { operations }
}

fn bind_message(desc: MessageDescriptor, registry: &TypeRegistry, unresolved: &mut usize) -> BoundMessage {
    let parts = desc.parts.map(|parts| {
        parts
            .into_iter()
            .map(|part| {
                let bound = bind_part(part, registry);
                if bound.xml_type.is_some() && bound.type_id.is_none() {
                    *unresolved += 1;
                }
                bound
            })
            .collect()
    });

    BoundMessage {
        soap_action: desc.soap_action,
        parts,
    }
}

fn bind_part(part: MessagePart, registry: &TypeRegistry) -> BoundPart {
    let type_id = part
        .xml_type
        .as_deref()
        .and_then(|name| registry.lookup(part.xml_type_ns.as_deref(), name));

    BoundPart {
        name: part.name,
        xml_type: part.xml_type,
        xml_type_ns: part.xml_type_ns,
        type_id,
    }
}
