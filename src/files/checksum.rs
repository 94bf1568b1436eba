//! SHA-256 checksums for verifying distributed copies.

use crate::error::{OrganizerError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Buffer size for reading files (8KB)
const BUFFER_SIZE: usize = 8192;

/// Hex-encoded SHA-256 of a file's contents
pub fn compute_file_checksum(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| OrganizerError::io(path, e))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; BUFFER_SIZE];

    // Read and hash in chunks
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| OrganizerError::io(path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Whether two files have identical contents
pub fn files_match(a: &Path, b: &Path) -> Result<bool> {
    Ok(compute_file_checksum(a)? == compute_file_checksum(b)?)
}
