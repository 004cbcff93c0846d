//! Parameter reshaping.
//!
//! Directives carry a flat parameter bag, while multi-part SOAP messages
//! need some parameters grouped under the part they belong to. Each input
//! parameter whose metadata names a `parentName` is moved under that group.

use crate::config::InputParam;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

/// Regroup flat parameters into the nested shape of the SOAP request.
///
/// Returns a new map; `input` is left untouched. Keys without metadata, or
/// whose metadata has no `parentName`, stay at the top level. The result
/// does not depend on the iteration order of `input`.
pub fn reshape(input: &Map<String, Value>, input_params: Option<&HashMap<String, InputParam>>) -> Map<String, Value> {
    let Some(input_params) = input_params else {
        return input.clone();
    };

    let parent_of = |key: &str| {
        input_params
            .get(key)
            .and_then(|param| param.parent_name.as_deref())
    };

    // Top-level keys first, so grouped keys always land on top of whatever
    // the caller already supplied under a group name.
    let mut output: Map<String, Value> = input
        .iter()
        .filter(|(key, _)| parent_of(key).is_none())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (key, value) in input {
        let Some(parent) = parent_of(key) else {
            continue;
        };

        let group = output
            .entry(parent.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !group.is_object() {
            warn!(
                group = %parent,
                parameter = %key,
                "Replacing non-object value with parameter group"
            );
            *group = Value::Object(Map::new());
        }
        if let Value::Object(members) = group {
            members.insert(key.clone(), value.clone());
        }
    }

    output
}
