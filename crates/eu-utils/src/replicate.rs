//! Replicate lookup by library accession.
//!
//! Operates on the `replicates` property of an experiment as returned by the
//! Portal with embedded objects, i.e. each replicate carries a `library`
//! object rather than a bare `@id` reference.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReplicateError, ReplicateResult};

/// Optional constraints on replicate numbers applied after the accession match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplicateFilter {
    pub biological: Option<u64>,
    pub technical: Option<u64>,
}

impl ReplicateFilter {
    /// Match on library accession alone.
    pub const fn any() -> Self {
        Self {
            biological: None,
            technical: None,
        }
    }

    pub fn biological(mut self, number: u64) -> Self {
        self.biological = Some(number);
        self
    }

    pub fn technical(mut self, number: u64) -> Self {
        self.technical = Some(number);
        self
    }
}

/// The library a replicate belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub accession: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// A decoded replicate record. Unknown Portal fields are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replicate {
    pub uuid: String,
    pub library: Library,
    #[serde(default)]
    pub biological_replicate_number: Option<u64>,
    #[serde(default)]
    pub technical_replicate_number: Option<u64>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Return the UUIDs of every replicate whose library accession equals
/// `lib_accession`, in input order, optionally narrowed by `filter`.
///
/// `replicates_json` may be the replicate array itself or an experiment
/// object holding it under `replicates`. No match yields an empty vector.
/// Every record must carry `library.accession` and `uuid` as strings,
/// otherwise [`ReplicateError::Malformed`] is returned.
pub fn does_lib_replicate_exist(
    replicates_json: &Value,
    lib_accession: &str,
    filter: ReplicateFilter,
) -> ReplicateResult<Vec<String>> {
    let records = replicate_list(replicates_json)?;
    let mut uuids = Vec::new();
    for (index, record) in matching_records(records, lib_accession, filter)? {
        uuids.push(string_at(record, index, "/uuid", "uuid")?.to_string());
    }
    Ok(uuids)
}

/// The replicate records [`does_lib_replicate_exist`] matches, as given.
///
/// Fields beyond the accession, uuid and filtered numbers are not checked.
pub fn find_lib_replicates<'a>(
    replicates_json: &'a Value,
    lib_accession: &str,
    filter: ReplicateFilter,
) -> ReplicateResult<Vec<&'a Value>> {
    let records = replicate_list(replicates_json)?;
    Ok(matching_records(records, lib_accession, filter)?
        .into_iter()
        .map(|(_, record)| record)
        .collect())
}

fn matching_records<'a>(
    records: &'a [Value],
    lib_accession: &str,
    filter: ReplicateFilter,
) -> ReplicateResult<Vec<(usize, &'a Value)>> {
    let mut matched = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let accession = string_at(record, index, "/library/accession", "library.accession")?;
        string_at(record, index, "/uuid", "uuid")?;
        if accession != lib_accession {
            continue;
        }
        if let Some(wanted) = filter.biological {
            if number_at(record, index, "biological_replicate_number")? != wanted {
                continue;
            }
        }
        if let Some(wanted) = filter.technical {
            if number_at(record, index, "technical_replicate_number")? != wanted {
                continue;
            }
        }
        matched.push((index, record));
    }

    tracing::debug!(
        accession = lib_accession,
        scanned = records.len(),
        matched = matched.len(),
        "replicate lookup"
    );
    Ok(matched)
}

/// Decode every record in `replicates_json` into a [`Replicate`].
pub fn parse_replicates(replicates_json: &Value) -> ReplicateResult<Vec<Replicate>> {
    replicate_list(replicates_json)?
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Replicate::deserialize(record).map_err(|e| ReplicateError::Decode {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

fn replicate_list(value: &Value) -> ReplicateResult<&[Value]> {
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(map) => match map.get("replicates") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(ReplicateError::NotAList {
                found: "an object without a `replicates` array",
            }),
        },
        other => Err(ReplicateError::NotAList {
            found: json_kind(other),
        }),
    }
}

fn string_at<'a>(
    record: &'a Value,
    index: usize,
    pointer: &str,
    field: &'static str,
) -> ReplicateResult<&'a str> {
    record
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or(ReplicateError::Malformed { index, field })
}

fn number_at(record: &Value, index: usize, field: &'static str) -> ReplicateResult<u64> {
    record
        .get(field)
        .and_then(Value::as_u64)
        .ok_or(ReplicateError::Malformed { index, field })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
