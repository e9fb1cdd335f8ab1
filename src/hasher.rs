//! Content digests for packed files

use std::{fmt, fs, path::Path};

use anyhow::{anyhow, ensure, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

// HMAC accepts keys of any length
type HmacSha256 = Hmac<Sha256>;

/// Secret used for keyed digests of the detail files. The keyed MAC state is built once and
/// cloned per digest.
#[derive(Clone)]
pub struct SecretKey {
    bytes: Vec<u8>,
    mac: HmacSha256,
}

impl SecretKey {
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        ensure!(!bytes.is_empty(), "Secret key must not be empty");
        let mac = HmacSha256::new_from_slice(&bytes)
            .map_err(|e| anyhow!("Failed to initialise HMAC with secret key: {}", e))?;
        Ok(Self { bytes, mac })
    }

    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let bytes = hex::decode(hex_key.trim()).context("Failed to decode secret key as hex")?;
        Self::new(bytes)
    }

    /// Raw key bytes, read verbatim from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read secret key file: {:?}", path))?;
        Self::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

// Never print key material
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({} bytes)", self.bytes.len())
    }
}

/// SHA-256 of the contents, base64 encoded
pub fn plain_digest(data: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(data))
}

/// HMAC-SHA-256 of the contents under the given key, base64 encoded
pub fn keyed_digest(data: &[u8], key: &SecretKey) -> String {
    let mut mac = key.mac.clone();
    mac.update(data);
    STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SecretKey {
        SecretKey::from_hex("d41fdbe337d001680c2a4d43afe570c7").unwrap()
    }

    #[test]
    fn test_plain_digest_known_value() {
        // sha256("hi")
        assert_eq!(
            plain_digest(b"hi"),
            "j0NDRmSPa5bfid2pAcUXaxCm2Dlh3TwayItZstwyeqQ="
        );
        assert_eq!(
            plain_digest(b""),
            "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }

    #[test]
    fn test_plain_digest_deterministic() {
        let data = b"some asset bytes";
        assert_eq!(plain_digest(data), plain_digest(data));
        assert_ne!(plain_digest(data), plain_digest(b"other asset bytes"));
    }

    #[test]
    fn test_keyed_digest_differs_from_plain() {
        let key = key();
        for data in [&b""[..], b"hi", b"bye", &[0u8; 1024]] {
            let keyed = keyed_digest(data, &key);
            assert_eq!(keyed.len(), 44);
            assert_eq!(keyed, keyed_digest(data, &key));
            assert_ne!(keyed, plain_digest(data));
        }
    }

    #[test]
    fn test_keyed_digest_known_value() {
        let key = key();
        // Each digest starts from a fresh copy of the keyed state
        for _ in 0..2 {
            assert_eq!(
                keyed_digest(b"hi", &key),
                "2WZ4tmwh/LT0IaNFGD4gJn+wNns0r7JbZKw3S0Afpwo="
            );
        }
    }

    #[test]
    fn test_keyed_digest_depends_on_key() {
        let other = SecretKey::new(b"another key".to_vec()).unwrap();
        assert_ne!(keyed_digest(b"hi", &key()), keyed_digest(b"hi", &other));
    }

    #[test]
    fn test_secret_key_validation() {
        assert!(SecretKey::from_hex("").is_err());
        assert!(SecretKey::from_hex("not hex").is_err());
        assert!(SecretKey::new(vec![]).is_err());
        assert_eq!(SecretKey::from_hex(" 00ff \n").unwrap().as_bytes(), &[0, 255]);
    }

    #[test]
    fn test_secret_key_debug_hides_bytes() {
        assert_eq!(format!("{:?}", key()), "SecretKey(16 bytes)");
    }
}
