//! Row-to-payload conversion for metadata sheets.
//!
//! Sheet format:
//!
//! - The first line is a tab-separated header of profile property names.
//!   Columns whose name starts with `#` are ignored, as is any property the
//!   sheet leaves empty on a given row.
//! - [`RECORD_ID_FIELD`] is accepted in addition to the schema's properties
//!   and names the record to PATCH.
//! - Blank lines and lines starting with `#` are skipped.
//! - Object-valued cells must hold JSON. Array cells hold comma-separated
//!   values; the surrounding `[` `]` are optional.

use std::io::BufRead;

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::config::RegisterConfig;
use crate::error::{RegisterError, RegisterResult};
use crate::schema::{ProfileSchema, PropertyType};

/// Sheet column naming the record a PATCH applies to. Not a schema property.
pub const RECORD_ID_FIELD: &str = "record_id";

/// Profile properties that fall back to [`RegisterConfig`] on POST.
const DEFAULTED_FIELDS: &[&str] = &["award", "lab"];

/// One row of a sheet, type-cast and ready to serialize.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
    /// 1-based line number of the source row.
    pub row: usize,
    pub fields: Map<String, Value>,
}

impl Payload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `record_id` cell, if the row has one.
    pub fn record_id(&self) -> Option<&str> {
        self.fields.get(RECORD_ID_FIELD).and_then(Value::as_str)
    }

    /// Fill `award`/`lab` from `config` where the profile has them and the
    /// row left them empty.
    pub fn apply_defaults(&mut self, schema: &ProfileSchema, config: &RegisterConfig) {
        for (field, default) in DEFAULTED_FIELDS.iter().zip([&config.award, &config.lab]) {
            let Some(default) = default else { continue };
            if schema.has_property(field) && !self.fields.contains_key(*field) {
                self.fields.insert((*field).to_string(), Value::String(default.clone()));
            }
        }
    }

    /// Convert into a PATCH body: `record_id` moves to the identifier key.
    pub fn into_patch(mut self, config: &RegisterConfig) -> RegisterResult<Payload> {
        let record_id = self
            .record_id()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or(RegisterError::MissingRecordId { row: self.row })?;
        self.fields.remove(RECORD_ID_FIELD);
        self.fields
            .insert(config.identifier_key.clone(), Value::String(record_id));
        Ok(self)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

#[derive(Debug)]
enum Column {
    Skip,
    Field(String),
}

/// Turns sheet rows into payloads for one profile.
#[derive(Debug)]
pub struct PayloadBuilder {
    profile: String,
    schema: ProfileSchema,
    config: RegisterConfig,
}

impl PayloadBuilder {
    pub fn new(profile: impl Into<String>, schema: ProfileSchema, config: RegisterConfig) -> Self {
        Self {
            profile: profile.into(),
            schema,
            config,
        }
    }

    pub fn config(&self) -> &RegisterConfig {
        &self.config
    }

    /// Parse every data row of the sheet.
    pub fn build_payloads<R: BufRead>(&self, reader: R) -> RegisterResult<Vec<Payload>> {
        let mut lines = reader.lines();
        let header = lines.next().ok_or(RegisterError::MissingHeader)??;
        let columns = self.parse_header(&header)?;

        let mut payloads = Vec::new();
        for (offset, line) in lines.enumerate() {
            let line = line?;
            let row = offset + 2;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() || line.starts_with('#') {
                debug!(row, "skipping blank or commented row");
                continue;
            }
            payloads.push(self.build_row(&columns, line, row)?);
        }
        debug!(profile = %self.profile, count = payloads.len(), "built payloads");
        Ok(payloads)
    }

    /// Payloads for registering new records, with configured defaults applied.
    pub fn post_payloads<R: BufRead>(&self, reader: R) -> RegisterResult<Vec<Payload>> {
        let mut payloads = self.build_payloads(reader)?;
        for payload in &mut payloads {
            payload.apply_defaults(&self.schema, &self.config);
        }
        Ok(payloads)
    }

    /// Payloads for patching existing records. Every row needs `record_id`.
    pub fn patch_payloads<R: BufRead>(&self, reader: R) -> RegisterResult<Vec<Payload>> {
        self.build_payloads(reader)?
            .into_iter()
            .map(|p| p.into_patch(&self.config))
            .collect()
    }

    fn parse_header(&self, header: &str) -> RegisterResult<Vec<Column>> {
        header
            .trim_end_matches(['\r', '\n'])
            .split('\t')
            .map(|name| {
                let name = name.trim();
                if name.starts_with('#') {
                    debug!(column = name, "skipping non-schema column");
                    Ok(Column::Skip)
                } else if name == RECORD_ID_FIELD || self.schema.has_property(name) {
                    Ok(Column::Field(name.to_string()))
                } else {
                    Err(RegisterError::UnknownField {
                        field: name.to_string(),
                        profile: self.profile.clone(),
                    })
                }
            })
            .collect()
    }

    fn build_row(&self, columns: &[Column], line: &str, row: usize) -> RegisterResult<Payload> {
        let cells: Vec<&str> = line.split('\t').collect();
        if cells.len() > columns.len() {
            return Err(RegisterError::RowTooLong {
                row,
                cells: cells.len(),
                fields: columns.len(),
            });
        }

        let mut fields = Map::new();
        fields.insert(
            self.config.profile_key.clone(),
            Value::String(self.profile.clone()),
        );
        for (column, cell) in columns.iter().zip(cells) {
            let Column::Field(field) = column else { continue };
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let value = if field == RECORD_ID_FIELD {
                Value::String(cell.to_string())
            } else {
                self.cast_cell(field, cell, row)?
            };
            fields.insert(field.clone(), value);
        }
        Ok(Payload { row, fields })
    }

    fn cast_cell(&self, field: &str, cell: &str, row: usize) -> RegisterResult<Value> {
        let Some(property) = self.schema.property(field) else {
            return Ok(Value::String(cell.to_string()));
        };
        match property.kind {
            PropertyType::Object => parse_json(field, cell, row),
            PropertyType::Array if property.item_kind() == PropertyType::Object => {
                let mut wrapped = String::with_capacity(cell.len() + 2);
                if !cell.starts_with('[') {
                    wrapped.push('[');
                }
                wrapped.push_str(cell);
                if !cell.ends_with(']') {
                    wrapped.push(']');
                }
                parse_json(field, &wrapped, row)
            }
            PropertyType::Array => {
                let unquoted: String = cell.chars().filter(|c| *c != '\'' && *c != '"').collect();
                let inner = unquoted.strip_prefix('[').unwrap_or(&unquoted);
                let inner = inner.strip_suffix(']').unwrap_or(inner);
                inner
                    .split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(|token| cast_scalar(field, token, property.item_kind(), row))
                    .collect::<RegisterResult<Vec<_>>>()
                    .map(Value::Array)
            }
            kind => cast_scalar(field, cell, kind, row),
        }
    }
}

fn parse_json(field: &str, text: &str, row: usize) -> RegisterResult<Value> {
    serde_json::from_str(text).map_err(|source| RegisterError::InvalidJson {
        field: field.to_string(),
        row,
        source,
    })
}

fn cast_scalar(field: &str, value: &str, kind: PropertyType, row: usize) -> RegisterResult<Value> {
    let invalid = || RegisterError::InvalidValue {
        field: field.to_string(),
        row,
        value: value.to_string(),
        expected: kind.as_str(),
    };
    match kind {
        PropertyType::Integer => value.parse::<i64>().map(Value::from).map_err(|_| invalid()),
        PropertyType::Number => {
            if let Ok(n) = value.parse::<i64>() {
                return Ok(Value::from(n));
            }
            value
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(invalid)
        }
        PropertyType::Boolean => match value.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        PropertyType::Object => parse_json(field, value, row),
        _ => Ok(Value::String(value.to_string())),
    }
}
