//! # Key Vault Builder
//!
//! Fluent accumulation of vault options into a configuration record, with a
//! single `build()` step that validates cross-field invariants, derives
//! dependent fields, and projects the configuration into resource records.
//!
//! Every operation consumes the builder and returns an updated copy, so a
//! partially configured builder can be cloned and forked freely; nothing is
//! validated until finalization except atomic values (secret and key names),
//! which are checked when their config value is constructed.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::arm::key_vault::{
    AccessPolicy, CreateMode, EntityAttributes, IpRule, KeyCurveName, KeyOperation, KeyType,
    NetworkAclAction, NetworkAclBypass, NetworkAcls, SecretValue, Sku, Vault, VaultAddPolicies,
    VaultKey, VaultProperties, VaultSecret, VirtualNetworkRule,
};
use crate::arm::ArmResource;
use crate::core::{merge_tags, ArmExpression, Location, ObjectId, ResourceName, Tags, TenantId};
use crate::error::{validate_entity_name, ValidationError};

/// Soft-delete behavior requested for the vault.
///
/// `build()` derives the rendered flags from this: no setting leaves both
/// `enableSoftDelete` and `enablePurgeProtection` absent, soft-deletion-only
/// sets `enableSoftDelete` alone, and purge protection sets both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftDelete {
    SoftDeletionOnly,
    SoftDeleteWithPurgeProtection,
}

/// A validated secret configuration. The name rule (1-127 characters,
/// letters/digits/hyphens) is enforced here, before any resource record
/// referencing the secret can exist.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretConfig {
    name: String,
    value: SecretValue,
    content_type: Option<String>,
    attributes: EntityAttributes,
    dependencies: Vec<ArmExpression>,
    tags: Tags,
}

impl SecretConfig {
    /// A secret whose value arrives as a secure template parameter named
    /// after the secret.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_entity_name(&name)?;
        let value = SecretValue::Parameter(name.clone());
        Ok(SecretConfig {
            name,
            value,
            content_type: None,
            attributes: EntityAttributes::default(),
            dependencies: Vec::new(),
            tags: Tags::new(),
        })
    }

    /// A secret whose value is an ARM expression evaluated at deployment
    /// time, e.g. another resource's connection string.
    pub fn from_expression(
        name: impl Into<String>,
        expression: ArmExpression,
    ) -> Result<Self, ValidationError> {
        let mut secret = SecretConfig::new(name)?;
        secret.value = SecretValue::Expression(expression);
        Ok(secret)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record a resource the expression value reads from, so emission is
    /// ordered after it.
    #[must_use]
    pub fn depends_on(mut self, dependency: ArmExpression) -> Self {
        self.dependencies.push(dependency);
        self
    }

    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.attributes.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn activation_date(mut self, date: DateTime<Utc>) -> Self {
        self.attributes.activation_date = Some(date);
        self
    }

    #[must_use]
    pub fn expiration_date(mut self, date: DateTime<Utc>) -> Self {
        self.attributes.expiration_date = Some(date);
        self
    }

    #[must_use]
    pub fn add_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// A validated key configuration. Shares the secret name rule.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyConfig {
    name: String,
    key_type: KeyType,
    key_size: Option<u32>,
    key_operations: Vec<KeyOperation>,
    curve_name: Option<KeyCurveName>,
    attributes: EntityAttributes,
    tags: Tags,
}

impl KeyConfig {
    pub fn new(name: impl Into<String>, key_type: KeyType) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_entity_name(&name)?;
        Ok(KeyConfig {
            name,
            key_type,
            key_size: None,
            key_operations: Vec::new(),
            curve_name: None,
            attributes: EntityAttributes::default(),
            tags: Tags::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn key_size(mut self, bits: u32) -> Self {
        self.key_size = Some(bits);
        self
    }

    #[must_use]
    pub fn key_operations(mut self, operations: impl IntoIterator<Item = KeyOperation>) -> Self {
        self.key_operations = operations.into_iter().collect();
        self
    }

    #[must_use]
    pub fn curve(mut self, curve: KeyCurveName) -> Self {
        self.curve_name = Some(curve);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.attributes.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn activation_date(mut self, date: DateTime<Utc>) -> Self {
        self.attributes.activation_date = Some(date);
        self
    }

    #[must_use]
    pub fn expiration_date(mut self, date: DateTime<Utc>) -> Self {
        self.attributes.expiration_date = Some(date);
        self
    }
}

impl AccessPolicy {
    /// Start a policy for a principal. Accepts a raw [`uuid::Uuid`], a GUID
    /// string (via `ObjectId::try_from`), or an [`ArmExpression`]; all
    /// normalize to the canonical [`ObjectId`] before storage.
    #[must_use]
    pub fn new(object_id: impl Into<ObjectId>) -> Self {
        AccessPolicy {
            object_id: object_id.into(),
            application_id: None,
            tenant_id: TenantId::default(),
            permissions: Default::default(),
        }
    }

    #[must_use]
    pub fn application_id(mut self, id: uuid::Uuid) -> Self {
        self.application_id = Some(id);
        self
    }

    #[must_use]
    pub fn tenant_id(mut self, tenant: impl Into<TenantId>) -> Self {
        self.tenant_id = tenant.into();
        self
    }

    #[must_use]
    pub fn key_permissions(
        mut self,
        permissions: impl IntoIterator<Item = crate::arm::key_vault::KeyPermission>,
    ) -> Self {
        self.permissions.keys = permissions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn secret_permissions(
        mut self,
        permissions: impl IntoIterator<Item = crate::arm::key_vault::SecretPermission>,
    ) -> Self {
        self.permissions.secrets = permissions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn certificate_permissions(
        mut self,
        permissions: impl IntoIterator<Item = crate::arm::key_vault::CertificatePermission>,
    ) -> Self {
        self.permissions.certificates = permissions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn storage_permissions(
        mut self,
        permissions: impl IntoIterator<Item = crate::arm::key_vault::StoragePermission>,
    ) -> Self {
        self.permissions.storage = permissions.into_iter().collect();
        self
    }
}

/// Accumulating configuration record for a vault deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyVaultBuilder {
    name: ResourceName,
    location: Location,
    sku: Sku,
    tenant_id: TenantId,
    enabled_for_deployment: Option<bool>,
    enabled_for_disk_encryption: Option<bool>,
    enabled_for_template_deployment: Option<bool>,
    rbac_authorization: Option<bool>,
    soft_delete: Option<SoftDelete>,
    create_mode: Option<CreateMode>,
    access_policies: Vec<AccessPolicy>,
    network_acls: NetworkAcls,
    secrets: Vec<SecretConfig>,
    keys: Vec<KeyConfig>,
    tags: Tags,
}

impl KeyVaultBuilder {
    /// Start a vault configuration with the documented defaults: Standard
    /// sku, the deploying subscription's tenant, the resource group's
    /// location, no access features, no soft delete, unspecified create
    /// mode.
    #[must_use]
    pub fn new(name: impl Into<ResourceName>) -> Self {
        KeyVaultBuilder {
            name: name.into(),
            location: Location::resource_group(),
            sku: Sku::Standard,
            tenant_id: TenantId::default(),
            enabled_for_deployment: None,
            enabled_for_disk_encryption: None,
            enabled_for_template_deployment: None,
            rbac_authorization: None,
            soft_delete: None,
            create_mode: None,
            access_policies: Vec::new(),
            network_acls: NetworkAcls::default(),
            secrets: Vec::new(),
            keys: Vec::new(),
            tags: Tags::new(),
        }
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<Location>) -> Self {
        self.location = location.into();
        self
    }

    #[must_use]
    pub fn sku(mut self, sku: Sku) -> Self {
        self.sku = sku;
        self
    }

    #[must_use]
    pub fn tenant_id(mut self, tenant: impl Into<TenantId>) -> Self {
        self.tenant_id = tenant.into();
        self
    }

    /// Allow Azure VMs to retrieve certificates stored as secrets
    /// (`enabledForDeployment`).
    #[must_use]
    pub fn enable_vm_access(mut self) -> Self {
        self.enabled_for_deployment = Some(true);
        self
    }

    /// Explicitly disable VM access. Renders `enabledForDeployment: false`,
    /// which differs from leaving the field unset.
    #[must_use]
    pub fn disable_vm_access(mut self) -> Self {
        self.enabled_for_deployment = Some(false);
        self
    }

    /// Allow Disk Encryption to retrieve secrets
    /// (`enabledForDiskEncryption`).
    #[must_use]
    pub fn enable_disk_encryption_access(mut self) -> Self {
        self.enabled_for_disk_encryption = Some(true);
        self
    }

    #[must_use]
    pub fn disable_disk_encryption_access(mut self) -> Self {
        self.enabled_for_disk_encryption = Some(false);
        self
    }

    /// Allow Resource Manager template deployments to read secrets
    /// (`enabledForTemplateDeployment`).
    #[must_use]
    pub fn enable_azure_services_access(mut self) -> Self {
        self.enabled_for_template_deployment = Some(true);
        self
    }

    #[must_use]
    pub fn disable_azure_services_access(mut self) -> Self {
        self.enabled_for_template_deployment = Some(false);
        self
    }

    #[must_use]
    pub fn enable_rbac_authorization(mut self) -> Self {
        self.rbac_authorization = Some(true);
        self
    }

    #[must_use]
    pub fn disable_rbac_authorization(mut self) -> Self {
        self.rbac_authorization = Some(false);
        self
    }

    #[must_use]
    pub fn enable_soft_delete(mut self) -> Self {
        self.soft_delete = Some(SoftDelete::SoftDeletionOnly);
        self
    }

    #[must_use]
    pub fn enable_soft_delete_with_purge_protection(mut self) -> Self {
        self.soft_delete = Some(SoftDelete::SoftDeleteWithPurgeProtection);
        self
    }

    #[must_use]
    pub fn create_mode(mut self, mode: CreateMode) -> Self {
        self.create_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn add_access_policy(mut self, policy: AccessPolicy) -> Self {
        self.access_policies.push(policy);
        self
    }

    #[must_use]
    pub fn add_access_policies(self, policies: impl IntoIterator<Item = AccessPolicy>) -> Self {
        policies
            .into_iter()
            .fold(self, KeyVaultBuilder::add_access_policy)
    }

    /// Add one secret. A secret with the same name replaces the earlier one
    /// in place (last write wins, insertion position preserved).
    #[must_use]
    pub fn add_secret(mut self, secret: SecretConfig) -> Self {
        if let Some(index) = self.secrets.iter().position(|s| s.name == secret.name) {
            debug!(name = %secret.name, "replacing previously added secret");
            self.secrets[index] = secret;
        } else {
            self.secrets.push(secret);
        }
        self
    }

    /// Fold of [`KeyVaultBuilder::add_secret`] over every element.
    #[must_use]
    pub fn add_secrets(self, secrets: impl IntoIterator<Item = SecretConfig>) -> Self {
        secrets.into_iter().fold(self, KeyVaultBuilder::add_secret)
    }

    #[must_use]
    pub fn add_key(mut self, key: KeyConfig) -> Self {
        if let Some(index) = self.keys.iter().position(|k| k.name == key.name) {
            debug!(name = %key.name, "replacing previously added key");
            self.keys[index] = key;
        } else {
            self.keys.push(key);
        }
        self
    }

    #[must_use]
    pub fn add_keys(self, keys: impl IntoIterator<Item = KeyConfig>) -> Self {
        keys.into_iter().fold(self, KeyVaultBuilder::add_key)
    }

    #[must_use]
    pub fn network_bypass(mut self, bypass: NetworkAclBypass) -> Self {
        self.network_acls.bypass = Some(bypass);
        self
    }

    #[must_use]
    pub fn network_default_action(mut self, action: NetworkAclAction) -> Self {
        self.network_acls.default_action = Some(action);
        self
    }

    #[must_use]
    pub fn add_ip_rule(mut self, cidr: impl Into<String>) -> Self {
        self.network_acls.ip_rules.push(IpRule { value: cidr.into() });
        self
    }

    #[must_use]
    pub fn add_vnet_rule(mut self, subnet_id: impl Into<String>) -> Self {
        self.network_acls
            .virtual_network_rules
            .push(VirtualNetworkRule {
                id: subnet_id.into(),
            });
        self
    }

    #[must_use]
    pub fn add_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn add_tags(mut self, tags: impl IntoIterator<Item = (String, String)>) -> Self {
        merge_tags(&mut self.tags, tags);
        self
    }

    /// Finalize: validate cross-field invariants, derive dependent fields,
    /// and project the configuration into resource records. Pure, no I/O.
    pub fn build(self) -> Result<KeyVault, ValidationError> {
        if matches!(self.create_mode, Some(CreateMode::Recover))
            && self.access_policies.is_empty()
        {
            return Err(ValidationError::RecoverRequiresAccessPolicies);
        }

        let (enable_soft_delete, enable_purge_protection) = match self.soft_delete {
            None => (None, None),
            Some(SoftDelete::SoftDeletionOnly) => (Some(true), None),
            Some(SoftDelete::SoftDeleteWithPurgeProtection) => (Some(true), Some(true)),
        };

        let network_acls = if self.network_acls.is_unset() {
            None
        } else {
            Some(self.network_acls)
        };

        debug!(
            vault = %self.name,
            secrets = self.secrets.len(),
            keys = self.keys.len(),
            "finalizing key vault configuration"
        );

        let vault = Vault {
            name: self.name.clone(),
            location: self.location.clone(),
            properties: VaultProperties {
                tenant_id: self.tenant_id,
                sku: self.sku,
                enabled_for_deployment: self.enabled_for_deployment,
                enabled_for_disk_encryption: self.enabled_for_disk_encryption,
                enabled_for_template_deployment: self.enabled_for_template_deployment,
                enable_rbac_authorization: self.rbac_authorization,
                enable_soft_delete,
                create_mode: self.create_mode,
                enable_purge_protection,
                access_policies: self.access_policies,
                network_acls,
            },
            tags: self.tags,
        };

        let secrets = self
            .secrets
            .into_iter()
            .map(|secret| VaultSecret {
                vault: self.name.clone(),
                name: ResourceName(secret.name),
                location: self.location.clone(),
                value: secret.value,
                content_type: secret.content_type,
                attributes: secret.attributes,
                extra_dependencies: secret.dependencies,
                tags: secret.tags,
            })
            .collect();

        let keys = self
            .keys
            .into_iter()
            .map(|key| VaultKey {
                vault: self.name.clone(),
                name: ResourceName(key.name),
                location: self.location.clone(),
                key_type: key.key_type,
                key_size: key.key_size,
                key_operations: key.key_operations,
                curve_name: key.curve_name,
                attributes: key.attributes,
                tags: key.tags,
            })
            .collect();

        Ok(KeyVault {
            vault,
            secrets,
            keys,
        })
    }
}

/// The finalized resource record set of a vault deployment: the vault
/// first, then its secrets and keys (which depend on it).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyVault {
    pub vault: Vault,
    pub secrets: Vec<VaultSecret>,
    pub keys: Vec<VaultKey>,
}

impl KeyVault {
    /// All records in emission order.
    #[must_use]
    pub fn resources(&self) -> Vec<&dyn ArmResource> {
        let mut resources: Vec<&dyn ArmResource> = vec![&self.vault];
        resources.extend(self.secrets.iter().map(|s| s as &dyn ArmResource));
        resources.extend(self.keys.iter().map(|k| k as &dyn ArmResource));
        resources
    }

    /// Rendered template fragments in emission order.
    #[must_use]
    pub fn to_json(&self) -> Vec<serde_json::Value> {
        self.resources()
            .iter()
            .map(|resource| resource.to_json())
            .collect()
    }

    /// The secure parameters the emitter must declare, one per
    /// parameter-valued secret, in insertion order.
    #[must_use]
    pub fn secure_parameters(&self) -> Vec<&str> {
        self.secrets
            .iter()
            .filter_map(|secret| secret.value.parameter_name())
            .collect()
    }
}

/// Builder for extending the access policies of an existing vault,
/// including one managed outside this deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyVaultAddPoliciesBuilder {
    vault: ResourceName,
    policies: Vec<AccessPolicy>,
}

impl KeyVaultAddPoliciesBuilder {
    #[must_use]
    pub fn new(vault: impl Into<ResourceName>) -> Self {
        KeyVaultAddPoliciesBuilder {
            vault: vault.into(),
            policies: Vec::new(),
        }
    }

    #[must_use]
    pub fn add_access_policy(mut self, policy: AccessPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    #[must_use]
    pub fn add_access_policies(self, policies: impl IntoIterator<Item = AccessPolicy>) -> Self {
        policies
            .into_iter()
            .fold(self, KeyVaultAddPoliciesBuilder::add_access_policy)
    }

    pub fn build(self) -> Result<VaultAddPolicies, ValidationError> {
        if self.policies.is_empty() {
            return Err(ValidationError::NoPoliciesToAdd {
                vault: self.vault.to_string(),
            });
        }
        Ok(VaultAddPolicies {
            vault: self.vault,
            policies: self.policies,
        })
    }
}
