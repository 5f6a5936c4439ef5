// src/hash.rs

//! Streaming SHA-256 digests for package files
//!
//! Files are never loaded whole; readers are fed through a fixed 64 KiB
//! buffer so hashing a large package costs constant memory.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// Read buffer size used when hashing (64 KiB)
pub const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Compute the hex SHA-256 of a byte slice
pub fn sha256(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Compute the hex SHA-256 of everything a reader yields
pub fn hash_reader<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute the hex SHA-256 of a file on disk
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    hash_reader(&mut file)
}

/// Check a file's digest against an expected hex value
///
/// Comparison ignores ASCII case so upper-case digests from other tools
/// still match.
pub fn verify_file(path: &Path, expected: &str) -> Result<()> {
    let actual = hash_file(path)
        .map_err(|e| Error::IoError(format!("Failed to hash {}: {e}", path.display())))?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(Error::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}
