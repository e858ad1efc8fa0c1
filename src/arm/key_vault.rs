//! # Key Vault Resource Records
//!
//! Records for `Microsoft.KeyVault` resources: the vault itself, its
//! secrets and keys (emitted as separate nested resources), and the
//! add-access-policies variant that extends a vault this deployment does
//! not own.
//!
//! Enum string tables here are a compatibility contract with the ARM
//! schema: permission actions are lower-cased, key operations are
//! camelCased, and key types and curve names use the exact hyphenated
//! spellings ("EC-HSM", "P-256").

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::arm::{envelope, ArmResource};
use crate::core::{ArmExpression, Location, ObjectId, ResourceName, ResourceType, Tags, TenantId};

pub const VAULTS: ResourceType = ResourceType {
    path: "Microsoft.KeyVault/vaults",
    api_version: "2019-09-01",
};

pub const SECRETS: ResourceType = ResourceType {
    path: "Microsoft.KeyVault/vaults/secrets",
    api_version: "2019-09-01",
};

pub const KEYS: ResourceType = ResourceType {
    path: "Microsoft.KeyVault/vaults/keys",
    api_version: "2019-09-01",
};

pub const ACCESS_POLICIES: ResourceType = ResourceType {
    path: "Microsoft.KeyVault/vaults/accessPolicies",
    api_version: "2019-09-01",
};

/// Vault pricing tier. Renders as the `sku` object `{family, name}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sku {
    #[default]
    Standard,
    Premium,
}

impl Sku {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Sku::Standard => "standard",
            Sku::Premium => "premium",
        }
    }
}

impl Serialize for Sku {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut sku = serializer.serialize_struct("Sku", 2)?;
        sku.serialize_field("family", "A")?;
        sku.serialize_field("name", self.name())?;
        sku.end()
    }
}

/// Vault creation semantics: fresh create vs restore of a soft-deleted
/// vault. Builders hold `Option<CreateMode>`; `None` means unspecified and
/// the field is omitted from the rendered fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateMode {
    Default,
    Recover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPermission {
    Encrypt,
    Decrypt,
    WrapKey,
    UnwrapKey,
    Sign,
    Verify,
    Get,
    List,
    Create,
    Update,
    Import,
    Delete,
    Backup,
    Restore,
    Recover,
    Purge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretPermission {
    Get,
    List,
    Set,
    Delete,
    Backup,
    Restore,
    Recover,
    Purge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificatePermission {
    Get,
    List,
    Delete,
    Create,
    Import,
    Update,
    ManageContacts,
    GetIssuers,
    ListIssuers,
    SetIssuers,
    DeleteIssuers,
    ManageIssuers,
    Recover,
    Purge,
    Backup,
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoragePermission {
    Get,
    List,
    Delete,
    Set,
    Update,
    RegenerateKey,
    Recover,
    Purge,
    Backup,
    Restore,
    SetSas,
    ListSas,
    GetSas,
    DeleteSas,
}

/// Permission sets over the four vault domains. Sets are ordered so the
/// rendered arrays are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub keys: BTreeSet<KeyPermission>,
    pub secrets: BTreeSet<SecretPermission>,
    pub certificates: BTreeSet<CertificatePermission>,
    pub storage: BTreeSet<StoragePermission>,
}

/// One (principal, permission-set) pair granting scoped access to a vault.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPolicy {
    pub object_id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<Uuid>,
    pub tenant_id: TenantId,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NetworkAclBypass {
    AzureServices,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NetworkAclAction {
    Allow,
    Deny,
}

/// Firewall rules for the vault. `ipRules` and `virtualNetworkRules` use
/// the wrapper object shapes the schema requires.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAcls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass: Option<NetworkAclBypass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_action: Option<NetworkAclAction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_rules: Vec<IpRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub virtual_network_rules: Vec<VirtualNetworkRule>,
}

impl NetworkAcls {
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.bypass.is_none()
            && self.default_action.is_none()
            && self.ip_rules.is_empty()
            && self.virtual_network_rules.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpRule {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualNetworkRule {
    pub id: String,
}

/// Property bag of the vault resource. Field names are the rendered keys;
/// `Option` fields are omitted when `None`; a `Some(false)` toggle renders
/// an explicit `false`, which ARM treats differently from an absent key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultProperties {
    pub tenant_id: TenantId,
    pub sku: Sku,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_for_deployment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_for_disk_encryption: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_for_template_deployment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_rbac_authorization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_soft_delete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_mode: Option<CreateMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_purge_protection: Option<bool>,
    pub access_policies: Vec<AccessPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_acls: Option<NetworkAcls>,
}

/// The vault resource itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Vault {
    pub name: ResourceName,
    pub location: Location,
    pub properties: VaultProperties,
    pub tags: Tags,
}

impl Vault {
    /// The expression `dependsOn` entries of child resources use.
    #[must_use]
    pub fn resource_id(&self) -> ArmExpression {
        VAULTS.resource_id(&self.name)
    }
}

impl ArmResource for Vault {
    fn resource_type(&self) -> ResourceType {
        VAULTS
    }

    fn resource_name(&self) -> ResourceName {
        self.name.clone()
    }

    fn to_json(&self) -> Value {
        let properties = serde_json::to_value(&self.properties)
            .unwrap_or_else(|_| json!({}));
        envelope(VAULTS, &self.name, Some(&self.location), &[], &self.tags, properties)
    }
}

/// The value carried by a vault secret: either a secure template parameter
/// (named after the secret) or an ARM expression evaluated at deployment
/// time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretValue {
    Parameter(String),
    Expression(ArmExpression),
}

impl SecretValue {
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            SecretValue::Parameter(name) => ArmExpression::new(format!("parameters('{name}')")).eval(),
            SecretValue::Expression(expression) => expression.eval(),
        }
    }

    /// The secure parameter the emitter must declare, if any.
    #[must_use]
    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            SecretValue::Parameter(name) => Some(name),
            SecretValue::Expression(_) => None,
        }
    }
}

/// Shared activation/expiration attributes of secrets and keys. Dates
/// render as Unix epoch seconds (`nbf`/`exp`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityAttributes {
    pub enabled: Option<bool>,
    pub activation_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
}

impl EntityAttributes {
    /// Render the `attributes` object, or `None` when nothing is set so
    /// the key is omitted entirely.
    #[must_use]
    pub fn to_json(&self) -> Option<Value> {
        let mut attributes = Map::new();
        if let Some(enabled) = self.enabled {
            attributes.insert("enabled".to_owned(), enabled.into());
        }
        if let Some(activation) = self.activation_date {
            attributes.insert("nbf".to_owned(), activation.timestamp().into());
        }
        if let Some(expiration) = self.expiration_date {
            attributes.insert("exp".to_owned(), expiration.timestamp().into());
        }
        if attributes.is_empty() {
            None
        } else {
            Some(Value::Object(attributes))
        }
    }
}

/// A secret stored in a vault, emitted as a nested
/// `Microsoft.KeyVault/vaults/secrets` resource.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultSecret {
    pub vault: ResourceName,
    pub name: ResourceName,
    pub location: Location,
    pub value: SecretValue,
    pub content_type: Option<String>,
    pub attributes: EntityAttributes,
    /// Dependencies carried by expression-valued secrets, in addition to
    /// the owning vault.
    pub extra_dependencies: Vec<ArmExpression>,
    pub tags: Tags,
}

impl ArmResource for VaultSecret {
    fn resource_type(&self) -> ResourceType {
        SECRETS
    }

    fn resource_name(&self) -> ResourceName {
        ResourceName(format!("{}/{}", self.vault, self.name))
    }

    fn depends_on(&self) -> Vec<ArmExpression> {
        let mut dependencies = vec![VAULTS.resource_id(&self.vault)];
        dependencies.extend(self.extra_dependencies.iter().cloned());
        dependencies
    }

    fn to_json(&self) -> Value {
        let mut properties = Map::new();
        properties.insert("value".to_owned(), self.value.render().into());
        if let Some(content_type) = &self.content_type {
            properties.insert("contentType".to_owned(), content_type.clone().into());
        }
        if let Some(attributes) = self.attributes.to_json() {
            properties.insert("attributes".to_owned(), attributes);
        }
        envelope(
            SECRETS,
            &self.resource_name(),
            Some(&self.location),
            &self.depends_on(),
            &self.tags,
            Value::Object(properties),
        )
    }
}

/// Cryptographic key kind. Spellings are mandated by the Key Vault schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyType {
    #[serde(rename = "EC")]
    Ec,
    #[serde(rename = "EC-HSM")]
    EcHsm,
    #[serde(rename = "RSA")]
    Rsa,
    #[serde(rename = "RSA-HSM")]
    RsaHsm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyCurveName {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-256K")]
    P256K,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "P-521")]
    P521,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyOperation {
    Encrypt,
    Decrypt,
    WrapKey,
    UnwrapKey,
    Sign,
    Verify,
}

/// A key stored in a vault, emitted as a nested
/// `Microsoft.KeyVault/vaults/keys` resource.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultKey {
    pub vault: ResourceName,
    pub name: ResourceName,
    pub location: Location,
    pub key_type: KeyType,
    pub key_size: Option<u32>,
    pub key_operations: Vec<KeyOperation>,
    pub curve_name: Option<KeyCurveName>,
    pub attributes: EntityAttributes,
    pub tags: Tags,
}

impl ArmResource for VaultKey {
    fn resource_type(&self) -> ResourceType {
        KEYS
    }

    fn resource_name(&self) -> ResourceName {
        ResourceName(format!("{}/{}", self.vault, self.name))
    }

    fn depends_on(&self) -> Vec<ArmExpression> {
        vec![VAULTS.resource_id(&self.vault)]
    }

    fn to_json(&self) -> Value {
        let mut properties = Map::new();
        properties.insert(
            "kty".to_owned(),
            serde_json::to_value(self.key_type).unwrap_or_else(|_| json!(null)),
        );
        if let Some(size) = self.key_size {
            properties.insert("keySize".to_owned(), size.into());
        }
        if !self.key_operations.is_empty() {
            properties.insert(
                "keyOps".to_owned(),
                serde_json::to_value(&self.key_operations).unwrap_or_else(|_| json!([])),
            );
        }
        if let Some(curve) = self.curve_name {
            properties.insert(
                "curveName".to_owned(),
                serde_json::to_value(curve).unwrap_or_else(|_| json!(null)),
            );
        }
        if let Some(attributes) = self.attributes.to_json() {
            properties.insert("attributes".to_owned(), attributes);
        }
        envelope(
            KEYS,
            &self.resource_name(),
            Some(&self.location),
            &self.depends_on(),
            &self.tags,
            Value::Object(properties),
        )
    }
}

/// Extends the access policies of an existing vault, including vaults
/// managed outside this deployment. Distinct from the vault's embedded
/// policies: the target is not owned here, so the record carries no
/// dependencies.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultAddPolicies {
    pub vault: ResourceName,
    pub policies: Vec<AccessPolicy>,
}

impl ArmResource for VaultAddPolicies {
    fn resource_type(&self) -> ResourceType {
        ACCESS_POLICIES
    }

    fn resource_name(&self) -> ResourceName {
        ResourceName(format!("{}/add", self.vault))
    }

    fn to_json(&self) -> Value {
        let properties = json!({
            "accessPolicies": serde_json::to_value(&self.policies).unwrap_or_else(|_| json!([])),
        });
        envelope(
            ACCESS_POLICIES,
            &self.resource_name(),
            None,
            &[],
            &Tags::new(),
            properties,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_renders_family_and_lowercase_name() {
        let json = serde_json::to_value(Sku::Premium).unwrap();
        assert_eq!(json, json!({"family": "A", "name": "premium"}));
    }

    #[test]
    fn permission_actions_render_lowercase() {
        assert_eq!(
            serde_json::to_value(KeyPermission::WrapKey).unwrap(),
            json!("wrapkey")
        );
        assert_eq!(
            serde_json::to_value(CertificatePermission::ManageContacts).unwrap(),
            json!("managecontacts")
        );
        assert_eq!(
            serde_json::to_value(StoragePermission::RegenerateKey).unwrap(),
            json!("regeneratekey")
        );
    }

    #[test]
    fn key_type_and_curve_use_hyphenated_spellings() {
        assert_eq!(serde_json::to_value(KeyType::EcHsm).unwrap(), json!("EC-HSM"));
        assert_eq!(serde_json::to_value(KeyType::RsaHsm).unwrap(), json!("RSA-HSM"));
        assert_eq!(
            serde_json::to_value(KeyCurveName::P256).unwrap(),
            json!("P-256")
        );
        assert_eq!(
            serde_json::to_value(KeyCurveName::P256K).unwrap(),
            json!("P-256K")
        );
    }

    #[test]
    fn key_operations_render_camel_case() {
        assert_eq!(
            serde_json::to_value(KeyOperation::WrapKey).unwrap(),
            json!("wrapKey")
        );
        assert_eq!(
            serde_json::to_value(KeyOperation::UnwrapKey).unwrap(),
            json!("unwrapKey")
        );
    }

    #[test]
    fn empty_attributes_are_omitted() {
        assert!(EntityAttributes::default().to_json().is_none());
    }

    #[test]
    fn attributes_render_dates_as_epoch_seconds() {
        use chrono::TimeZone;

        let attributes = EntityAttributes {
            enabled: Some(true),
            activation_date: Some(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 10).unwrap()),
            expiration_date: None,
        };
        assert_eq!(
            attributes.to_json().unwrap(),
            json!({"enabled": true, "nbf": 10})
        );
    }

    #[test]
    fn add_policies_record_targets_the_add_sub_resource() {
        let record = VaultAddPolicies {
            vault: ResourceName::from("kv1"),
            policies: Vec::new(),
        };
        let json = record.to_json();
        assert_eq!(json["name"], json!("kv1/add"));
        assert_eq!(json["type"], json!("Microsoft.KeyVault/vaults/accessPolicies"));
        assert!(record.depends_on().is_empty());
    }
}
