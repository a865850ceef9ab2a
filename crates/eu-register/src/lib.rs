//! Offline payload construction for ENCODE DCC metadata registration.
//!
//! A metadata sheet is a tab-delimited file whose header names properties of
//! one Portal profile (e.g. `biosample`). [`PayloadBuilder`] type-casts each
//! row against the profile's JSON schema and yields [`Payload`]s ready to be
//! POSTed, or converted into PATCH bodies with [`Payload::into_patch`].
//!
//! Nothing here talks to the network: schemas are read from disk and
//! payloads are handed back to the caller.

pub mod config;
pub mod error;
pub mod patch;
pub mod payload;
pub mod schema;

pub use config::RegisterConfig;
pub use error::{RegisterError, RegisterResult};
pub use patch::{extend_array_values, find_record};
pub use payload::{Payload, PayloadBuilder, RECORD_ID_FIELD};
pub use schema::{ItemSchema, ProfileSchema, PropertySchema, PropertyType};
