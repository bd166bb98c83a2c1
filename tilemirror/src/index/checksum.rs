//! MD5 checksum calculation for local tiles.
//!
//! The server publishes an MD5 per tile. It is used only as a fast equality
//! fingerprint to decide whether a local file is current.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::{Digest, Md5};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the MD5 checksum of a file.
///
/// # Arguments
///
/// * `path` - Path to the file to checksum
///
/// # Returns
///
/// The lowercase hexadecimal MD5 of the file contents.
pub fn calculate_file_md5(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// MD5 of an in-memory buffer.
pub fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}
