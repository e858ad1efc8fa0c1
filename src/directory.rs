//! # Directory Lookup Helper
//!
//! Best-effort resolution of directory principals (users, groups) into
//! object ids usable in access policies.
//!
//! The actual search (an `az` CLI invocation or a Graph query) is an
//! external collaborator injected as a function. This helper only builds
//! the OR-filter string, parses the JSON array response, and degrades every
//! failure to an empty result: a broken lookup must never abort
//! configuration building.

use serde_json::Value;
use tracing::{debug, warn};

use crate::core::ObjectId;

/// A directory principal resolved by a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryObject {
    pub display_name: String,
    pub object_id: ObjectId,
}

/// Build the OData-style OR-filter over one field:
/// `field eq 'v1' or field eq 'v2' ...`.
#[must_use]
pub fn build_filter(field: &str, values: &[&str]) -> String {
    values
        .iter()
        .map(|value| format!("{field} eq '{value}'"))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Look up directory objects whose `field` matches any of `values`.
///
/// `search` receives the assembled filter and returns the raw JSON response
/// (an array of objects with `displayName` and `objectId` keys). Any
/// failure (the search call itself, malformed JSON, missing keys) yields
/// an empty list.
pub fn find_directory_objects<F>(field: &str, values: &[&str], search: F) -> Vec<DirectoryObject>
where
    F: FnOnce(&str) -> anyhow::Result<String>,
{
    let filter = build_filter(field, values);
    debug!(%filter, "directory lookup");

    let response = match search(&filter) {
        Ok(response) => response,
        Err(err) => {
            warn!(%filter, error = %err, "directory search failed, returning no results");
            return Vec::new();
        }
    };

    let entries: Vec<Value> = match serde_json::from_str(&response) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(error = %err, "directory response was not a JSON array, returning no results");
            return Vec::new();
        }
    };

    entries
        .iter()
        .filter_map(|entry| {
            let display_name = entry.get("displayName")?.as_str()?;
            let object_id = entry.get("objectId")?.as_str()?;
            let object_id = ObjectId::try_from(object_id).ok()?;
            Some(DirectoryObject {
                display_name: display_name.to_owned(),
                object_id,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_joins_candidates_with_or() {
        assert_eq!(
            build_filter("displayName", &["alice", "bob"]),
            "displayName eq 'alice' or displayName eq 'bob'"
        );
        assert_eq!(build_filter("displayName", &["alice"]), "displayName eq 'alice'");
    }

    #[test]
    fn parses_display_name_and_object_id_pairs() {
        let results = find_directory_objects("displayName", &["alice"], |filter| {
            assert_eq!(filter, "displayName eq 'alice'");
            Ok(r#"[{"displayName": "alice", "objectId": "00000000-0000-0000-0000-000000000001"}]"#
                .to_owned())
        });
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].display_name, "alice");
        assert_eq!(
            results[0].object_id.as_str(),
            "00000000-0000-0000-0000-000000000001"
        );
    }

    #[test]
    fn search_failure_degrades_to_empty() {
        let results = find_directory_objects("displayName", &["alice"], |_| {
            Err(anyhow::anyhow!("az not found"))
        });
        assert!(results.is_empty());
    }

    #[test]
    fn malformed_json_degrades_to_empty() {
        let results =
            find_directory_objects("displayName", &["alice"], |_| Ok("not json".to_owned()));
        assert!(results.is_empty());
    }

    #[test]
    fn entries_missing_keys_are_skipped() {
        let results = find_directory_objects("displayName", &["alice", "bob"], |_| {
            Ok(r#"[
                {"displayName": "alice"},
                {"displayName": "bob", "objectId": "00000000-0000-0000-0000-000000000002"}
            ]"#
            .to_owned())
        });
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].display_name, "bob");
    }
}
