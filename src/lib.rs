//! # armforge
//!
//! Declarative, validated builders for Azure Resource Manager (ARM)
//! templates.
//!
//! The library is organized as a projection pipeline:
//!
//! 1. **Builders** ([`builders`]) accumulate user options into immutable
//!    configuration records. Operations can be applied in any order and
//!    never perform I/O.
//! 2. **Finalization** (`build()`) validates structural and cross-field
//!    invariants, derives dependent fields, and produces resource records.
//! 3. **Resource records** ([`arm`]) render themselves into the template
//!    JSON fragments an external emitter assembles and deploys.
//!
//! ```
//! use armforge::builders::key_vault::{KeyVaultBuilder, SecretConfig};
//! use armforge::arm::key_vault::{AccessPolicy, SecretPermission};
//! use uuid::Uuid;
//!
//! let vault = KeyVaultBuilder::new("kv1")
//!     .add_access_policy(
//!         AccessPolicy::new(Uuid::new_v4())
//!             .secret_permissions([SecretPermission::Get, SecretPermission::List]),
//!     )
//!     .add_secret(SecretConfig::new("db-password")?)
//!     .build()?;
//! let fragments = vault.to_json();
//! assert_eq!(fragments.len(), 2);
//! # Ok::<(), armforge::error::ValidationError>(())
//! ```

pub mod arm;
pub mod builders;
pub mod core;
pub mod directory;
pub mod error;

pub use crate::arm::ArmResource;
pub use crate::core::{ArmExpression, Location, ObjectId, ResourceName, Seconds, Tags, TenantId};
pub use crate::error::ValidationError;
