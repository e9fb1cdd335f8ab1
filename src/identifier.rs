use anyhow::{Context, Result};
use rand::{rngs::OsRng, RngCore};

/// Number of hex characters kept from the random bytes
pub const IDENTIFIER_LEN: usize = 9;

/// Generate a short random identifier for a build. Collisions between builds are accepted.
pub fn new_identifier() -> Result<String> {
    let mut buf = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut buf)
        .context("Failed to read from the OS random source")?;

    let mut identifier = hex::encode(buf);
    identifier.truncate(IDENTIFIER_LEN);
    Ok(identifier)
}
