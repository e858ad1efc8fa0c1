//! # Validation Errors
//!
//! Error taxonomy for the builder layer.
//!
//! Two categories surface to callers as hard stops:
//! - structural errors, raised when an atomic value is constructed (for
//!   example a malformed secret name)
//! - cross-field errors, raised only at finalization (for example recover
//!   mode with no access policies)
//!
//! Best-effort directory lookups are the third category; those never
//! surface here; they degrade to empty results inside
//! [`crate::directory`].

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Charset rule for Key Vault secret and key names: letters, digits, and
/// hyphens only. Length is checked separately so the message can name the
/// violated rule precisely.
static ENTITY_NAME_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("static charset pattern is valid"));

/// Maximum length of a vault secret or key name.
pub const MAX_ENTITY_NAME_LEN: usize = 127;

/// A validation failure during builder accumulation or finalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A vault secret or key name violated the charset-and-length rule.
    #[error("'{name}' is not a valid key vault entity name: {reason}")]
    InvalidEntityName { name: String, reason: String },

    /// Recover mode restores a soft-deleted vault and must re-establish who
    /// may access it; finalizing with an empty policy list is rejected.
    #[error("create mode 'recover' requires at least one access policy")]
    RecoverRequiresAccessPolicies,

    /// An add-access-policies deployment with nothing to add is a
    /// configuration mistake, not a no-op.
    #[error("at least one access policy must be added to vault '{vault}'")]
    NoPoliciesToAdd { vault: String },
}

/// Check a vault secret/key name against the charset-and-length rule:
/// 1 to 127 characters, each in `[A-Za-z0-9-]`.
pub fn validate_entity_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::InvalidEntityName {
            name: name.to_owned(),
            reason: "name must not be empty".to_owned(),
        });
    }
    if name.len() > MAX_ENTITY_NAME_LEN {
        return Err(ValidationError::InvalidEntityName {
            name: name.to_owned(),
            reason: format!(
                "name is {} characters long, maximum is {MAX_ENTITY_NAME_LEN}",
                name.len()
            ),
        });
    }
    if !ENTITY_NAME_CHARSET.is_match(name) {
        return Err(ValidationError::InvalidEntityName {
            name: name.to_owned(),
            reason: "name may only contain letters, digits, and hyphens".to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_letters_digits_and_hyphens_up_to_127_chars() {
        validate_entity_name("db-Password-1").expect("valid name");
        validate_entity_name(&"a".repeat(127)).expect("127 chars is the maximum");
    }

    #[test]
    fn rejects_empty_names() {
        let err = validate_entity_name("").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn rejects_names_over_127_chars() {
        let err = validate_entity_name(&"a".repeat(128)).unwrap_err();
        assert!(err.to_string().contains("128 characters"));
    }

    #[test]
    fn rejects_names_with_disallowed_characters() {
        for bad in ["db password", "db_password", "db.password", "pässword"] {
            let err = validate_entity_name(bad).unwrap_err();
            assert!(
                err.to_string().contains("letters, digits, and hyphens"),
                "expected charset error for {bad:?}"
            );
            assert!(err.to_string().contains(bad), "message names the value");
        }
    }
}
