//! MD5 checksums as the DCC expects them on file records.
//!
//! The Portal stores `md5sum` as 32 lowercase hex characters. Files are
//! streamed in fixed-size chunks so large FASTQ/BAM uploads are never held
//! in memory.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::{Digest, Md5};
use tracing::debug;

use crate::error::{ChecksumError, ChecksumResult};

/// Incremental MD5 hasher producing lowercase hex digests.
#[derive(Clone, Default)]
pub struct Md5Hasher {
    inner: Md5,
    bytes: u64,
}

impl Md5Hasher {
    /// Size of each read when hashing from a reader.
    pub const CHUNK_SIZE: usize = 1 << 20;

    /// Create an empty hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
        self.bytes += data.len() as u64;
    }

    /// Feed everything `reader` yields until EOF. Returns the bytes consumed.
    pub fn update_reader<R: Read>(&mut self, mut reader: R) -> io::Result<u64> {
        let mut buf = vec![0u8; Self::CHUNK_SIZE];
        let mut consumed = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.update(&buf[..n]);
            consumed += n as u64;
        }
        Ok(consumed)
    }

    /// Total bytes hashed so far.
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes
    }

    /// Consume the hasher and return the lowercase hex digest.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.inner.finalize())
    }
}

impl std::fmt::Debug for Md5Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Md5Hasher")
            .field("bytes", &self.bytes)
            .finish()
    }
}

/// MD5 of an in-memory byte slice, as lowercase hex.
pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// MD5 of a file's full contents, as lowercase hex.
///
/// Fails with [`ChecksumError::FileAccess`] if the path does not exist or
/// cannot be read.
pub fn calculate_md5sum(path: impl AsRef<Path>) -> ChecksumResult<String> {
    let path = path.as_ref();
    let file_access = |source: io::Error| ChecksumError::FileAccess {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(file_access)?;
    let mut hasher = Md5Hasher::new();
    let bytes = hasher.update_reader(file).map_err(file_access)?;
    let digest = hasher.finalize_hex();
    debug!(path = %path.display(), bytes, %digest, "computed md5sum");
    Ok(digest)
}

/// Check a file against an expected digest. Comparison ignores hex case.
pub fn verify_md5sum(path: impl AsRef<Path>, expected: &str) -> ChecksumResult<bool> {
    Ok(calculate_md5sum(path)?.eq_ignore_ascii_case(expected.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FOX: &[u8] = b"The quick brown fox jumps over the lazy dog";
    const FOX_MD5: &str = "9e107d9d372bb6826bd81d3542a419d6";
    const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";

    fn write_temp(data: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(data).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn known_digest_of_bytes() {
        assert_eq!(md5_hex(FOX), FOX_MD5);
        assert_eq!(md5_hex(b""), EMPTY_MD5);
    }

    #[test]
    fn file_digest_matches_bytes_digest() {
        let file = write_temp(FOX);
        assert_eq!(calculate_md5sum(file.path()).unwrap(), FOX_MD5);
    }

    #[test]
    fn empty_file() {
        let file = write_temp(b"");
        assert_eq!(calculate_md5sum(file.path()).unwrap(), EMPTY_MD5);
    }

    #[test]
    fn digest_is_deterministic() {
        let file = write_temp(b"@read1\nACGT\n+\nIIII\n");
        let first = calculate_md5sum(file.path()).unwrap();
        let second = calculate_md5sum(file.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn spans_multiple_chunks() {
        let data = vec![b'N'; Md5Hasher::CHUNK_SIZE * 2 + 17];
        let file = write_temp(&data);
        assert_eq!(calculate_md5sum(file.path()).unwrap(), md5_hex(&data));
    }

    #[test]
    fn incremental_matches_one_shot() {
        let mut hasher = Md5Hasher::new();
        hasher.update(&FOX[..10]);
        hasher.update(&FOX[10..]);
        assert_eq!(hasher.bytes_hashed(), FOX.len() as u64);
        assert_eq!(hasher.finalize_hex(), FOX_MD5);
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.fastq.gz");
        let err = calculate_md5sum(&missing).unwrap_err();
        match err {
            ChecksumError::FileAccess { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
        }
    }

    #[test]
    fn directory_is_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            calculate_md5sum(dir.path()),
            Err(ChecksumError::FileAccess { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_file_access_error() {
        use std::os::unix::fs::PermissionsExt;

        let file = write_temp(FOX);
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o000)).unwrap();
        // root ignores file modes
        if File::open(file.path()).is_ok() {
            return;
        }
        match calculate_md5sum(file.path()).unwrap_err() {
            ChecksumError::FileAccess { path, source } => {
                assert_eq!(path, file.path());
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
        }
    }

    #[test]
    fn verify_ignores_case() {
        let file = write_temp(FOX);
        assert!(verify_md5sum(file.path(), &FOX_MD5.to_uppercase()).unwrap());
        assert!(!verify_md5sum(file.path(), EMPTY_MD5).unwrap());
    }
}
