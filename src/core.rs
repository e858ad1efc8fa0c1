//! # Core Value Types
//!
//! Primitive value types shared by every resource kind: resource names,
//! locations, ARM expressions, resource types, and principal identifiers.
//!
//! These types are deliberately thin. They exist to keep the builder surface
//! strongly typed and to pin down the canonical internal representation for
//! every value that accepts more than one external form (raw GUID, parsed
//! string, ARM expression).

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Name of an ARM resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceName(pub String);

impl ResourceName {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceName {
    fn from(name: &str) -> Self {
        ResourceName(name.to_owned())
    }
}

impl From<String> for ResourceName {
    fn from(name: String) -> Self {
        ResourceName(name)
    }
}

/// An Azure location. Either a concrete region name, the literal "global",
/// or an ARM expression resolved at deployment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location(String);

impl Location {
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Location(region.into())
    }

    /// The pseudo-location used by global resources such as Traffic Manager
    /// profiles.
    #[must_use]
    pub fn global() -> Self {
        Location("global".to_owned())
    }

    /// Inherit the location of the enclosing resource group. This is the
    /// default for resources that do not set a location explicitly.
    #[must_use]
    pub fn resource_group() -> Self {
        Location("[resourceGroup().location]".to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Location {
    fn from(region: &str) -> Self {
        Location::new(region)
    }
}

/// An ARM template expression, stored without the surrounding brackets.
///
/// `ArmExpression::new("resourceGroup().location")` renders as
/// `[resourceGroup().location]` via [`ArmExpression::eval`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArmExpression(String);

impl ArmExpression {
    #[must_use]
    pub fn new(expression: impl Into<String>) -> Self {
        ArmExpression(expression.into())
    }

    /// Wrap a plain string as a quoted expression literal.
    #[must_use]
    pub fn literal(value: &str) -> Self {
        ArmExpression(format!("'{value}'"))
    }

    /// Render the bracketed form consumed by the template engine.
    #[must_use]
    pub fn eval(&self) -> String {
        format!("[{}]", self.0)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An ARM resource type together with the API version the rendered fragment
/// is written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceType {
    pub path: &'static str,
    pub api_version: &'static str,
}

impl ResourceType {
    /// The `resourceId(...)` expression referencing a resource of this type,
    /// as used in `dependsOn` lists.
    #[must_use]
    pub fn resource_id(&self, name: &ResourceName) -> ArmExpression {
        // Nested names like "vault/secret" become extra resourceId arguments
        let segments = name
            .as_str()
            .split('/')
            .map(|segment| format!("'{segment}'"))
            .collect::<Vec<_>>()
            .join(", ");
        ArmExpression::new(format!("resourceId('{}', {})", self.path, segments))
    }
}

/// Canonical principal identifier for access policies.
///
/// Accepts a raw [`Uuid`], a GUID string, or an [`ArmExpression`] (for
/// principals only known at deployment time, e.g. a managed identity's
/// `principalId`). All forms normalize to the render-ready string stored
/// here; the configuration record only ever carries this canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectId(String);

impl ObjectId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for ObjectId {
    fn from(id: Uuid) -> Self {
        ObjectId(id.to_string())
    }
}

impl From<ArmExpression> for ObjectId {
    fn from(expression: ArmExpression) -> Self {
        ObjectId(expression.eval())
    }
}

impl TryFrom<&str> for ObjectId {
    type Error = uuid::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Uuid::parse_str(value).map(ObjectId::from)
    }
}

/// Tenant identifier. Defaults to the deploying subscription's tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantId(String);

impl TenantId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        TenantId(ArmExpression::new("subscription().tenantId").eval())
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        TenantId(id.to_string())
    }
}

impl From<ArmExpression> for TenantId {
    fn from(expression: ArmExpression) -> Self {
        TenantId(expression.eval())
    }
}

impl TryFrom<&str> for TenantId {
    type Error = uuid::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Uuid::parse_str(value).map(TenantId::from)
    }
}

/// A duration expressed in whole seconds.
///
/// Builder operations that accept a time value take `impl Into<Seconds>` so
/// callers can pass either an integer second count or a
/// [`std::time::Duration`]; both normalize to the same canonical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Seconds(pub u64);

impl From<u64> for Seconds {
    fn from(seconds: u64) -> Self {
        Seconds(seconds)
    }
}

impl From<u32> for Seconds {
    fn from(seconds: u32) -> Self {
        Seconds(u64::from(seconds))
    }
}

impl From<std::time::Duration> for Seconds {
    fn from(duration: std::time::Duration) -> Self {
        Seconds(duration.as_secs())
    }
}

/// Resource tags. Merging is last-write-wins.
pub type Tags = HashMap<String, String>;

/// Merge `extra` into `tags`, overwriting existing keys.
pub fn merge_tags(tags: &mut Tags, extra: impl IntoIterator<Item = (String, String)>) {
    tags.extend(extra);
}
