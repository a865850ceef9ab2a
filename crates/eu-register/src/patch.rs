//! Merging PATCH payloads with the records they update.
//!
//! By default a PATCH extends array-valued properties instead of replacing
//! them: the record's current array plus the new values, with duplicates
//! removed and first occurrences kept in place.

use eu_utils::extend_set;
use serde_json::{Map, Value};

/// Extend every array in `patch` with the matching array from `existing`.
///
/// Keys missing from `existing`, or not arrays on both sides, are left as
/// they are in `patch`.
pub fn extend_array_values(existing: &Map<String, Value>, patch: &mut Map<String, Value>) {
    for (key, value) in patch.iter_mut() {
        let (Value::Array(current), Value::Array(additions)) =
            (existing.get(key).unwrap_or(&Value::Null), &*value)
        else {
            continue;
        };
        let merged = extend_set(current, additions.iter().cloned());
        tracing::debug!(
            property = %key,
            before = current.len(),
            after = merged.len(),
            "extended array value"
        );
        *value = Value::Array(merged);
    }
}

/// Find the record an identifier refers to.
///
/// The Portal accepts a UUID, accession, `@id` path, or any alias as an
/// identifier, so all of them are checked.
pub fn find_record<'a>(records: &'a [Value], identifier: &str) -> Option<&'a Map<String, Value>> {
    records.iter().filter_map(Value::as_object).find(|record| {
        ["uuid", "accession", "@id"]
            .iter()
            .any(|key| record.get(*key).and_then(Value::as_str) == Some(identifier))
            || record
                .get("aliases")
                .and_then(Value::as_array)
                .is_some_and(|aliases| aliases.iter().any(|a| a.as_str() == Some(identifier)))
    })
}
