//! Schema type registry.
//!
//! Types live in an arena and refer to each other by [`TypeId`], so base-type
//! chains and member composition can form arbitrary graphs without shared
//! ownership. The registry is built once and never mutated afterwards.

use crate::config::{ContentMember, TypeDescriptor};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Combine a namespace and local name into a qualified name.
///
/// Uses Clark notation (`{namespace}local`). An absent or empty namespace
/// yields the bare local name.
pub fn make_qname(namespace: Option<&str>, local: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{{{ns}}}{local}"),
        _ => local.to_string(),
    }
}

/// Index of a type inside a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

/// A resolved schema type.
#[derive(Debug, Clone)]
pub struct SchemaType {
    /// Qualified name
    pub full_name: String,
    /// Declared base type reference, as configured
    pub base_type_ref: Option<(Option<String>, String)>,
    /// Resolved base type (absent when undeclared or unmatched)
    pub base_type: Option<TypeId>,
    /// Content members in declaration order
    pub content: Vec<TypeMember>,
}

/// A content member with its resolved type.
#[derive(Debug, Clone)]
pub struct TypeMember {
    pub name: String,
    pub xml_type: Option<String>,
    pub xml_type_ns: Option<String>,
    /// Resolved member type (absent when untyped or unmatched)
    pub type_id: Option<TypeId>,
}

impl From<ContentMember> for TypeMember {
    fn from(member: ContentMember) -> Self {
        Self {
            name: member.name,
            xml_type: member.xml_type,
            xml_type_ns: member.xml_type_ns,
            type_id: None,
        }
    }
}

/// Lookup of schema types by qualified name.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: Vec<SchemaType>,
    index: HashMap<String, TypeId>,
}

impl TypeRegistry {
    /// Build the registry and resolve base-type and member references.
    ///
    /// A duplicate qualified name replaces the earlier descriptor (last write
    /// wins) while keeping its slot. References that match nothing resolve
    /// to `None`; no error is raised.
    pub fn build(descriptors: Vec<TypeDescriptor>) -> Self {
        let mut registry = Self::default();

        for descriptor in descriptors {
            let schema_type = SchemaType {
                base_type_ref: descriptor
                    .base_type_name
                    .map(|name| (descriptor.base_type_ns, name)),
                full_name: descriptor.full_name,
                base_type: None,
                content: descriptor.content.into_iter().map(TypeMember::from).collect(),
            };

            match registry.index.get(&schema_type.full_name) {
                Some(&TypeId(slot)) => {
                    debug!(type_name = %schema_type.full_name, "Duplicate type name, replacing");
                    registry.types[slot] = schema_type;
                }
                None => {
                    let id = TypeId(registry.types.len());
                    registry.index.insert(schema_type.full_name.clone(), id);
                    registry.types.push(schema_type);
                }
            }
        }

        registry.resolve_references();
        registry
    }

    fn resolve_references(&mut self) {
        let mut unresolved = 0usize;

        for slot in 0..self.types.len() {
            let base_type = self.types[slot]
                .base_type_ref
                .as_ref()
                .and_then(|(ns, name)| self.lookup(ns.as_deref(), name));
            if self.types[slot].base_type_ref.is_some() && base_type.is_none() {
                unresolved += 1;
            }

            let member_types: Vec<Option<TypeId>> = self.types[slot]
                .content
                .iter()
                .map(|member| {
                    member
                        .xml_type
                        .as_deref()
                        .and_then(|name| self.lookup(member.xml_type_ns.as_deref(), name))
                })
                .collect();

            let schema_type = &mut self.types[slot];
            schema_type.base_type = base_type;
            for (member, type_id) in schema_type.content.iter_mut().zip(member_types) {
                if member.xml_type.is_some() && type_id.is_none() {
                    unresolved += 1;
                }
                member.type_id = type_id;
            }
        }

        debug!(
            types = self.types.len(),
            unresolved_references = unresolved,
            "Type registry built"
        );
    }

    /// Find a type by qualified name.
    pub fn get(&self, qname: &str) -> Option<TypeId> {
        self.index.get(qname).copied()
    }

    /// Find a type by namespace and local name.
    pub fn lookup(&self, namespace: Option<&str>, local: &str) -> Option<TypeId> {
        self.get(&make_qname(namespace, local))
    }

    /// Access a type by id.
    ///
    /// Returns `None` for an id this registry never handed out.
    pub fn type_of(&self, id: TypeId) -> Option<&SchemaType> {
        self.types.get(id.0)
    }

    /// Resolved base type of `id`.
    pub fn base_type(&self, id: TypeId) -> Option<&SchemaType> {
        self.type_of(id)?.base_type.and_then(|base| self.type_of(base))
    }

    /// Walk the base-type chain of `id`, nearest ancestor first.
    ///
    /// Stops at the first type already visited, so a cyclic chain terminates.
    pub fn ancestors(&self, id: TypeId) -> Vec<TypeId> {
        let mut seen = HashSet::from([id]);
        let mut chain = Vec::new();
        let mut current = self.type_of(id).and_then(|t| t.base_type);
        while let Some(base) = current {
            if !seen.insert(base) {
                break;
            }
            chain.push(base);
            current = self.type_of(base).and_then(|t| t.base_type);
        }
        chain
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &SchemaType)> {
        self.types.iter().enumerate().map(|(i, t)| (TypeId(i), t))
    }
}
