//! # Configuration Builders
//!
//! Fluent accumulators over immutable configuration records. Operations can
//! be applied in any order; validation and derivation happen once, at
//! `build()`, which projects the configuration into the resource records of
//! [`crate::arm`].
//!
//! ## Module Structure
//!
//! - `key_vault.rs` - vault, secret, key, and add-access-policies builders
//! - `traffic_manager.rs` - profile and endpoint builders

pub mod key_vault;
pub mod traffic_manager;
