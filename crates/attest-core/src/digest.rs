//! Content fingerprinting.
//!
//! A `verified` status is a trust signal shown to end users, so the
//! fingerprint must be a deterministic, collision-resistant digest of the
//! file bytes — never a stand-in value.
//!
//! ```text
//! fingerprint = "sha256:" + lowercase_hex(SHA256(file_bytes))
//! ```

use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Scheme prefix carried by every fingerprint.
pub const FINGERPRINT_PREFIX: &str = "sha256:";

/// Total length of a well-formed fingerprint: prefix + 64 hex chars.
pub const FINGERPRINT_LEN: usize = 71;

const READ_CHUNK: usize = 64 * 1024;

/// Fingerprint an in-memory byte slice.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    format!("{}{}", FINGERPRINT_PREFIX, hex::encode(Sha256::digest(bytes)))
}

/// Fingerprint the file at `path`, streaming it in chunks so large
/// documents never sit in memory whole.
pub async fn fingerprint_file(path: impl AsRef<Path>) -> io::Result<String> {
    let mut file = File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!(
        "{}{}",
        FINGERPRINT_PREFIX,
        hex::encode(hasher.finalize())
    ))
}

/// Check that `value` is shaped like a fingerprint this crate produced.
pub fn is_fingerprint(value: &str) -> bool {
    value.len() == FINGERPRINT_LEN
        && value.starts_with(FINGERPRINT_PREFIX)
        && value[FINGERPRINT_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}
