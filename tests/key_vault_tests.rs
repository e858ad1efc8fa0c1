//! # Key Vault Builder Tests
//!
//! End-to-end coverage of the vault configuration pipeline: defaults,
//! option accumulation, cross-field validation at finalization, derivation
//! of dependent fields, and the rendered fragment shape.

use armforge::arm::key_vault::{
    AccessPolicy, CreateMode, KeyCurveName, KeyType, NetworkAclAction, NetworkAclBypass,
    SecretPermission, Sku,
};
use armforge::arm::ArmResource;
use armforge::builders::key_vault::{
    KeyConfig, KeyVaultAddPoliciesBuilder, KeyVaultBuilder, SecretConfig,
};
use armforge::core::ArmExpression;
use armforge::error::ValidationError;
use chrono::{TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

mod common;

fn object_id(digit: u32) -> Uuid {
    Uuid::parse_str(&format!("00000000-0000-0000-0000-{digit:012}")).unwrap()
}

#[test]
fn defaults_are_standard_sku_subscription_tenant_and_group_location() {
    let vault = KeyVaultBuilder::new("kv1").build().unwrap();
    let json = vault.vault.to_json();

    assert_eq!(json["type"], json!("Microsoft.KeyVault/vaults"));
    assert_eq!(json["apiVersion"], json!("2019-09-01"));
    assert_eq!(json["name"], json!("kv1"));
    assert_eq!(json["location"], json!("[resourceGroup().location]"));
    assert_eq!(
        json["properties"]["sku"],
        json!({"family": "A", "name": "standard"})
    );
    assert_eq!(
        json["properties"]["tenantId"],
        json!("[subscription().tenantId]")
    );
    assert_eq!(json["properties"]["accessPolicies"], json!([]));

    // Unset options are omitted entirely, not rendered as null
    for absent in [
        "enabledForDeployment",
        "enabledForDiskEncryption",
        "enabledForTemplateDeployment",
        "enableRbacAuthorization",
        "enableSoftDelete",
        "enablePurgeProtection",
        "createMode",
        "networkAcls",
    ] {
        assert!(
            json["properties"].get(absent).is_none(),
            "{absent} should be absent by default"
        );
    }
    assert!(json.get("tags").is_none());
    assert!(json.get("dependsOn").is_none());
}

#[test]
fn finalization_is_deterministic() {
    common::init_tracing();
    let build = || {
        KeyVaultBuilder::new("kv1")
            .sku(Sku::Premium)
            .enable_soft_delete_with_purge_protection()
            .add_access_policy(
                AccessPolicy::new(object_id(7))
                    .secret_permissions([SecretPermission::Get, SecretPermission::List]),
            )
            .add_secret(SecretConfig::new("db-password").unwrap())
            .add_tag("env", "prod")
            .build()
            .unwrap()
    };
    let first = build();
    let second = build();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.to_json()).unwrap(),
        serde_json::to_string(&second.to_json()).unwrap()
    );
}

#[test]
fn recover_mode_without_policies_fails_finalization() {
    let result = KeyVaultBuilder::new("kv1")
        .create_mode(CreateMode::Recover)
        .build();
    assert_eq!(
        result.unwrap_err(),
        ValidationError::RecoverRequiresAccessPolicies
    );
}

#[test]
fn recover_mode_with_one_policy_renders_the_recover_token() {
    let vault = KeyVaultBuilder::new("kv1")
        .create_mode(CreateMode::Recover)
        .add_access_policy(AccessPolicy::new(object_id(1)))
        .build()
        .unwrap();
    assert_eq!(vault.vault.to_json()["properties"]["createMode"], json!("recover"));
}

#[test]
fn soft_delete_derivation_covers_all_three_modes() {
    let unset = KeyVaultBuilder::new("kv1").build().unwrap();
    let properties = &unset.vault.to_json()["properties"];
    assert!(properties.get("enableSoftDelete").is_none());
    assert!(properties.get("enablePurgeProtection").is_none());

    let soft_only = KeyVaultBuilder::new("kv1").enable_soft_delete().build().unwrap();
    let properties = &soft_only.vault.to_json()["properties"];
    assert_eq!(properties["enableSoftDelete"], json!(true));
    assert!(properties.get("enablePurgeProtection").is_none());

    let purge = KeyVaultBuilder::new("kv1")
        .enable_soft_delete_with_purge_protection()
        .build()
        .unwrap();
    let properties = &purge.vault.to_json()["properties"];
    assert_eq!(properties["enableSoftDelete"], json!(true));
    assert_eq!(properties["enablePurgeProtection"], json!(true));
}

#[test]
fn explicit_false_differs_from_unset() {
    let disabled = KeyVaultBuilder::new("kv1").disable_vm_access().build().unwrap();
    assert_eq!(
        disabled.vault.to_json()["properties"]["enabledForDeployment"],
        json!(false)
    );

    let unset = KeyVaultBuilder::new("kv1").build().unwrap();
    assert!(unset.vault.to_json()["properties"]
        .get("enabledForDeployment")
        .is_none());
}

#[test]
fn adding_secrets_one_at_a_time_equals_adding_them_in_a_batch() {
    let one_by_one = KeyVaultBuilder::new("kv1")
        .add_secret(SecretConfig::new("first").unwrap())
        .add_secret(SecretConfig::new("second").unwrap())
        .add_secret(SecretConfig::new("third").unwrap())
        .build()
        .unwrap();
    let batch = KeyVaultBuilder::new("kv1")
        .add_secrets([
            SecretConfig::new("first").unwrap(),
            SecretConfig::new("second").unwrap(),
            SecretConfig::new("third").unwrap(),
        ])
        .build()
        .unwrap();
    assert_eq!(one_by_one, batch);

    // Insertion order of distinct names is preserved in the output
    let names: Vec<String> = batch
        .secrets
        .iter()
        .map(|secret| secret.resource_name().to_string())
        .collect();
    assert_eq!(names, vec!["kv1/first", "kv1/second", "kv1/third"]);
}

#[test]
fn duplicate_secret_names_are_last_write_wins() {
    common::init_tracing();
    let vault = KeyVaultBuilder::new("kv1")
        .add_secret(SecretConfig::new("db-password").unwrap())
        .add_secret(SecretConfig::new("other").unwrap())
        .add_secret(SecretConfig::new("db-password").unwrap().content_type("text/plain"))
        .build()
        .unwrap();
    assert_eq!(vault.secrets.len(), 2);
    // Replacement keeps the original position
    assert_eq!(vault.secrets[0].resource_name().to_string(), "kv1/db-password");
    assert_eq!(vault.secrets[0].content_type.as_deref(), Some("text/plain"));
}

#[test]
fn secret_name_validation_happens_at_construction() {
    let too_long = "x".repeat(128);
    for bad in ["", "has space", "has_underscore", too_long.as_str()] {
        let err = SecretConfig::new(bad).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEntityName { .. }));
    }
    assert!(SecretConfig::new(&"x".repeat(127)).is_ok());
    assert!(SecretConfig::new("Db-Password-2").is_ok());
}

#[test]
fn activation_date_renders_as_epoch_seconds() {
    let vault = KeyVaultBuilder::new("kv1")
        .add_secret(
            SecretConfig::new("token")
                .unwrap()
                .activation_date(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 10).unwrap()),
        )
        .build()
        .unwrap();
    let secret = vault.secrets[0].to_json();
    assert_eq!(secret["properties"]["attributes"]["nbf"], json!(10));
}

#[test]
fn secrets_depend_on_their_vault_plus_expression_sources() {
    let storage_key = ArmExpression::new(
        "listKeys(resourceId('Microsoft.Storage/storageAccounts', 'stg'), '2019-06-01').keys[0].value",
    );
    let vault = KeyVaultBuilder::new("kv1")
        .add_secret(
            SecretConfig::from_expression("storage-key", storage_key)
                .unwrap()
                .depends_on(ArmExpression::new(
                    "resourceId('Microsoft.Storage/storageAccounts', 'stg')",
                )),
        )
        .build()
        .unwrap();

    let secret = vault.secrets[0].to_json();
    assert_eq!(secret["name"], json!("kv1/storage-key"));
    let depends_on = secret["dependsOn"].as_array().unwrap();
    assert_eq!(
        depends_on[0],
        json!("[resourceId('Microsoft.KeyVault/vaults', 'kv1')]")
    );
    assert_eq!(
        depends_on[1],
        json!("[resourceId('Microsoft.Storage/storageAccounts', 'stg')]")
    );
    // Expression-valued secrets declare no secure parameter
    assert!(vault.secure_parameters().is_empty());
}

#[test]
fn parameter_secrets_declare_secure_parameters_in_insertion_order() {
    let vault = KeyVaultBuilder::new("kv1")
        .add_secrets([
            SecretConfig::new("first").unwrap(),
            SecretConfig::new("second").unwrap(),
        ])
        .build()
        .unwrap();
    assert_eq!(vault.secure_parameters(), vec!["first", "second"]);
    assert_eq!(
        vault.secrets[0].to_json()["properties"]["value"],
        json!("[parameters('first')]")
    );
}

#[test]
fn keys_render_protocol_mandated_spellings() {
    let vault = KeyVaultBuilder::new("kv1")
        .add_key(
            KeyConfig::new("signing-key", KeyType::EcHsm)
                .unwrap()
                .curve(KeyCurveName::P256),
        )
        .build()
        .unwrap();
    let key = vault.keys[0].to_json();
    assert_eq!(key["type"], json!("Microsoft.KeyVault/vaults/keys"));
    assert_eq!(key["name"], json!("kv1/signing-key"));
    assert_eq!(key["properties"]["kty"], json!("EC-HSM"));
    assert_eq!(key["properties"]["curveName"], json!("P-256"));
}

#[test]
fn network_acls_render_the_schema_key_names() {
    let vault = KeyVaultBuilder::new("kv1")
        .network_bypass(NetworkAclBypass::AzureServices)
        .network_default_action(NetworkAclAction::Deny)
        .add_ip_rule("203.0.113.0/24")
        .add_vnet_rule("subnet-1")
        .build()
        .unwrap();
    let acls = &vault.vault.to_json()["properties"]["networkAcls"];
    assert_eq!(acls["bypass"], json!("AzureServices"));
    assert_eq!(acls["defaultAction"], json!("Deny"));
    assert_eq!(acls["ipRules"], json!([{"value": "203.0.113.0/24"}]));
    assert_eq!(acls["virtualNetworkRules"], json!([{"id": "subnet-1"}]));
}

#[test]
fn tag_merge_is_last_write_wins() {
    let vault = KeyVaultBuilder::new("kv1")
        .add_tag("env", "dev")
        .add_tags([("env".to_owned(), "prod".to_owned()), ("team".to_owned(), "core".to_owned())])
        .build()
        .unwrap();
    let tags = &vault.vault.to_json()["tags"];
    assert_eq!(tags["env"], json!("prod"));
    assert_eq!(tags["team"], json!("core"));
}

#[test]
fn add_policies_builder_requires_at_least_one_policy() {
    let err = KeyVaultAddPoliciesBuilder::new("shared-kv").build().unwrap_err();
    assert_eq!(
        err,
        ValidationError::NoPoliciesToAdd {
            vault: "shared-kv".to_owned()
        }
    );

    let record = KeyVaultAddPoliciesBuilder::new("shared-kv")
        .add_access_policy(AccessPolicy::new(object_id(9)))
        .build()
        .unwrap();
    let json = record.to_json();
    assert_eq!(json["name"], json!("shared-kv/add"));
    assert_eq!(json["properties"]["accessPolicies"].as_array().unwrap().len(), 1);
}

/// The worked example: vault "kv1", Standard sku, one access policy for a
/// fixed object id with {get, list} secret permissions, recover mode.
#[test]
fn end_to_end_recovered_vault_example() {
    common::init_tracing();
    let vault = KeyVaultBuilder::new("kv1")
        .sku(Sku::Standard)
        .create_mode(CreateMode::Recover)
        .add_access_policy(
            AccessPolicy::new(object_id(1))
                .secret_permissions([SecretPermission::Get, SecretPermission::List]),
        )
        .build()
        .unwrap();

    let json = vault.vault.to_json();
    assert_eq!(json["properties"]["createMode"], json!("recover"));

    let policies = json["properties"]["accessPolicies"].as_array().unwrap();
    assert_eq!(policies.len(), 1);
    assert_eq!(
        policies[0]["objectId"],
        json!("00000000-0000-0000-0000-000000000001")
    );
    assert_eq!(policies[0]["permissions"]["secrets"], json!(["get", "list"]));
}
