//! Helpers shared by ENCODE DCC client tooling.
//!
//! Every function here is a pure, single-pass transformation except
//! [`calculate_md5sum`], which streams a file from disk.
//!
//! # Modules
//!
//! - [`set`] — order-preserving set merges over plain vectors
//! - [`checksum`] — MD5 digests of files and byte slices
//! - [`alias`] — alias sanitizing and lab-prefix handling
//! - [`replicate`] — replicate lookup by library accession

pub mod alias;
pub mod checksum;
pub mod error;
pub mod replicate;
pub mod set;

pub use alias::{clean_alias_name, strip_alias_prefix, Alias};
pub use checksum::{calculate_md5sum, md5_hex, verify_md5sum, Md5Hasher};
pub use error::{ChecksumError, ChecksumResult, ReplicateError, ReplicateResult};
pub use replicate::{
    does_lib_replicate_exist, find_lib_replicates, parse_replicates, Library, Replicate, ReplicateFilter,
};
pub use set::{add_to_set, extend_set};
