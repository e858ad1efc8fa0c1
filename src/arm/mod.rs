//! # ARM Resource Records
//!
//! Finalized, render-ready descriptions of individual ARM resources.
//!
//! Records are produced exclusively by builder finalization, are never
//! mutated afterwards, and are consumed once by an external template
//! emitter. Rendering is a pure function of the record's own fields: the
//! dependency set in particular is derived from the record, never looked up
//! elsewhere.
//!
//! ## Module Structure
//!
//! - `key_vault.rs` - Vault, secret, key, and add-access-policies records
//! - `traffic_manager.rs` - Profile and endpoint records

pub mod key_vault;
pub mod traffic_manager;

use serde_json::{Map, Value};

use crate::core::{ArmExpression, Location, ResourceName, ResourceType, Tags};

/// A finalized resource record that renders into one ARM template fragment.
pub trait ArmResource {
    /// The ARM resource type and API version this record renders against.
    fn resource_type(&self) -> ResourceType;

    /// The full template name of the resource (nested resources include the
    /// parent segments, e.g. `"kv1/db-password"`).
    fn resource_name(&self) -> ResourceName;

    /// The `resourceId(...)` expressions of the resources this record
    /// references. Used by the emitter to order deployment.
    fn depends_on(&self) -> Vec<ArmExpression> {
        Vec::new()
    }

    /// Render the template fragment. Pure: consults no external state.
    fn to_json(&self) -> Value;
}

/// Assemble the common resource envelope around a kind-specific property
/// bag. Optional parts (`location`, `dependsOn`, `tags`) are omitted when
/// absent or empty rather than emitted as null.
pub(crate) fn envelope(
    resource_type: ResourceType,
    name: &ResourceName,
    location: Option<&Location>,
    depends_on: &[ArmExpression],
    tags: &Tags,
    properties: Value,
) -> Value {
    let mut resource = Map::new();
    resource.insert("type".to_owned(), resource_type.path.into());
    resource.insert("apiVersion".to_owned(), resource_type.api_version.into());
    resource.insert("name".to_owned(), name.as_str().into());
    if let Some(location) = location {
        resource.insert("location".to_owned(), location.as_str().into());
    }
    if !depends_on.is_empty() {
        let ids: Vec<Value> = depends_on.iter().map(|dep| dep.eval().into()).collect();
        resource.insert("dependsOn".to_owned(), Value::Array(ids));
    }
    if !tags.is_empty() {
        let map: Map<String, Value> = tags
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        resource.insert("tags".to_owned(), Value::Object(map));
    }
    resource.insert("properties".to_owned(), properties);
    Value::Object(resource)
}
