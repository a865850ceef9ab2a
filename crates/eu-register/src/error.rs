use std::path::PathBuf;

/// Errors raised while reading schemas or building payloads.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// A header field is neither a schema property, `record_id`, nor `#`-prefixed.
    #[error("unknown field '{field}', which is not a property of the '{profile}' profile")]
    UnknownField { field: String, profile: String },

    /// A cell destined for an object-typed property is not valid JSON.
    #[error("invalid JSON in field '{field}', row {row}: {source}")]
    InvalidJson {
        field: String,
        row: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A scalar could not be cast to the schema's type.
    #[error("invalid {expected} value '{value}' in field '{field}', row {row}")]
    InvalidValue {
        field: String,
        row: usize,
        value: String,
        expected: &'static str,
    },

    /// A row has more cells than the header has fields.
    #[error("row {row} has {cells} cells but the header only has {fields}")]
    RowTooLong {
        row: usize,
        cells: usize,
        fields: usize,
    },

    /// A PATCH payload lacks the `record_id` identifier.
    #[error("cannot patch the payload from row {row}: no 'record_id' field identifies the record")]
    MissingRecordId { row: usize },

    /// The sheet has no header line.
    #[error("input has no header line")]
    MissingHeader,

    /// The schema document is unusable.
    #[error("invalid schema {origin}: {reason}")]
    Schema { origin: String, reason: String },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a sheet, schema, or config from disk failed.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while streaming input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for registration operations.
pub type RegisterResult<T> = Result<T, RegisterError>;
