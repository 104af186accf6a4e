//! Authenticated at-rest container for engine state.
//!
//! An [`EncryptedBlob`] owns nothing but a file path. With an empty key it
//! reads and writes raw bytes; with a 32-byte key the payload is sealed
//! with AES-256-GCM. Every write draws a fresh random 96-bit nonce and
//! prepends it to the ciphertext, so the on-disk layout is
//! `nonce(12) || ciphertext || tag(16)`. Any other key length is refused.

use std::fs;
use std::path::Path;

use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, KeyInit, Nonce};

use crate::error::{Error, Result};

/// Required key length for encrypted persistence.
pub const KEY_BYTES: usize = 32;

const NONCE_BYTES: usize = 12;
const TAG_BYTES: usize = 16;

/// Per-file read/write handle. Does not buffer; every operation goes to
/// the file system.
pub struct EncryptedBlob {
    path: String,
}

impl EncryptedBlob {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Whether the backing file exists.
    pub fn exists(&self) -> bool {
        Path::new(&self.path).exists()
    }

    /// Read the file. An empty key returns the raw contents; a 32-byte key
    /// decrypts and authenticates.
    pub fn read(&self, key: &[u8]) -> Result<Vec<u8>> {
        if !self.exists() {
            return Err(Error::FileNotFound(self.path.clone()));
        }
        let raw = fs::read(&self.path)?;

        if key.is_empty() {
            return Ok(raw);
        }
        if key.len() != KEY_BYTES {
            return Err(Error::InvalidKeyLength(key.len()));
        }
        if raw.len() < NONCE_BYTES + TAG_BYTES {
            return Err(Error::Decryption);
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_BYTES);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| Error::Decryption)
    }

    /// Write `payload` to the file, sealed when a 32-byte key is supplied.
    pub fn write(&self, payload: &[u8], key: &[u8]) -> Result<()> {
        if key.is_empty() {
            fs::write(&self.path, payload)?;
            return Ok(());
        }
        if key.len() != KEY_BYTES {
            return Err(Error::InvalidKeyLength(key.len()));
        }

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher.encrypt(&nonce, payload).map_err(|_| Error::Decryption)?;

        let mut out = Vec::with_capacity(NONCE_BYTES + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        fs::write(&self.path, out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob_in(dir: &tempfile::TempDir, name: &str) -> EncryptedBlob {
        EncryptedBlob::new(dir.path().join(name).to_string_lossy().into_owned())
    }

    #[test]
    fn plaintext_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let blob = blob_in(&dir, "plain");
        assert!(!blob.exists());

        blob.write(b"42 17 99 ", &[]).unwrap();
        assert!(blob.exists());
        assert_eq!(blob.read(&[]).unwrap(), b"42 17 99 ");
    }

    #[test]
    fn encrypted_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let blob = blob_in(&dir, "sealed");
        let key = [0x01u8; KEY_BYTES];

        blob.write(b"state payload", &key).unwrap();
        assert_eq!(blob.read(&key).unwrap(), b"state payload");
    }

    #[test]
    fn ciphertext_is_not_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let blob = blob_in(&dir, "sealed");
        let key = [0x01u8; KEY_BYTES];
        let payload = b"state payload";

        blob.write(payload, &key).unwrap();
        let on_disk = std::fs::read(dir.path().join("sealed")).unwrap();
        assert_eq!(on_disk.len(), payload.len() + NONCE_BYTES + TAG_BYTES);
        assert!(!on_disk.windows(payload.len()).any(|w| w == payload));
    }

    #[test]
    fn fresh_nonce_per_write() {
        let dir = tempfile::tempdir().unwrap();
        let blob = blob_in(&dir, "sealed");
        let key = [0x01u8; KEY_BYTES];

        blob.write(b"same payload", &key).unwrap();
        let first = std::fs::read(dir.path().join("sealed")).unwrap();
        blob.write(b"same payload", &key).unwrap();
        let second = std::fs::read(dir.path().join("sealed")).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let dir = tempfile::tempdir().unwrap();
        let blob = blob_in(&dir, "sealed");

        blob.write(b"secret", &[0x01u8; KEY_BYTES]).unwrap();
        let result = blob.read(&[0x02u8; KEY_BYTES]);
        assert!(matches!(result, Err(Error::Decryption)));
    }

    #[test]
    fn any_flipped_bit_fails_authentication() {
        let dir = tempfile::tempdir().unwrap();
        let blob = blob_in(&dir, "sealed");
        let key = [0x01u8; KEY_BYTES];
        let path = dir.path().join("sealed");

        blob.write(b"tamper target", &key).unwrap();
        let original = std::fs::read(&path).unwrap();

        // Flip one bit in every byte position: nonce, ciphertext, and tag
        // must all be covered by authentication.
        for i in 0..original.len() {
            let mut tampered = original.clone();
            tampered[i] ^= 0x01;
            std::fs::write(&path, &tampered).unwrap();
            assert!(
                matches!(blob.read(&key), Err(Error::Decryption)),
                "flip at byte {i} went undetected"
            );
        }
    }

    #[test]
    fn short_ciphertext_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let blob = blob_in(&dir, "stub");
        std::fs::write(dir.path().join("stub"), [0u8; 10]).unwrap();
        assert!(matches!(blob.read(&[0x01u8; KEY_BYTES]), Err(Error::Decryption)));
    }

    #[test]
    fn invalid_key_length_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let blob = blob_in(&dir, "sealed");

        assert!(matches!(
            blob.write(b"x", &[0u8; 16]),
            Err(Error::InvalidKeyLength(16))
        ));
        blob.write(b"x", &[0u8; KEY_BYTES]).unwrap();
        assert!(matches!(
            blob.read(&[0u8; 31]),
            Err(Error::InvalidKeyLength(31))
        ));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let blob = blob_in(&dir, "absent");
        assert!(matches!(blob.read(&[]), Err(Error::FileNotFound(_))));
    }
}
