//! Symmetric file encryption
//!
//! The refined store is sealed with AES-256-GCM under a key derived from
//! the configured pre-shared secret. Layout of the sealed file:
//!
//! ```text
//! b"BRF1" || nonce (12 bytes) || ciphertext + tag
//! ```

use std::path::{Path, PathBuf};

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{RefinerError, RefinerResult};

/// Leading bytes of every sealed file
pub const MAGIC: &[u8; 4] = b"BRF1";

/// Suffix appended to the plaintext path
pub const ENCRYPTED_EXTENSION: &str = "enc";

const NONCE_LEN: usize = 12;

/// Encrypts a file under a caller-supplied key
pub trait FileEncryptor {
    /// Encrypt `path` with `key`, returning the path of the sealed file
    fn encrypt(&self, key: &str, path: &Path) -> RefinerResult<PathBuf>;
}

/// AES-256-GCM file encryptor
#[derive(Debug, Default, Clone, Copy)]
pub struct AesGcmEncryptor;

impl AesGcmEncryptor {
    pub fn new() -> Self {
        Self
    }

    fn cipher(key: &str) -> RefinerResult<Aes256Gcm> {
        if key.is_empty() {
            return Err(RefinerError::Configuration(
                "encryption key is not set".to_string(),
            ));
        }
        let digest = Sha256::digest(key.as_bytes());
        Aes256Gcm::new_from_slice(&digest)
            .map_err(|e| RefinerError::Encryption(format!("Invalid key length: {}", e)))
    }

    /// Path the sealed copy of `path` is written to
    pub fn encrypted_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(ENCRYPTED_EXTENSION);
        PathBuf::from(name)
    }

    /// Seal a byte buffer
    pub fn encrypt_bytes(key: &str, plaintext: &[u8]) -> RefinerResult<Vec<u8>> {
        let cipher = Self::cipher(key)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| RefinerError::Encryption(format!("Encryption failed: {}", e)))?;

        let mut sealed = Vec::with_capacity(MAGIC.len() + NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(MAGIC);
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Open a buffer produced by [`AesGcmEncryptor::encrypt_bytes`]
    pub fn decrypt_bytes(key: &str, sealed: &[u8]) -> RefinerResult<Vec<u8>> {
        let cipher = Self::cipher(key)?;
        let body = sealed
            .strip_prefix(MAGIC.as_slice())
            .ok_or_else(|| RefinerError::Encryption("Missing BRF1 header".to_string()))?;
        if body.len() < NONCE_LEN {
            return Err(RefinerError::Encryption("Truncated nonce".to_string()));
        }
        let (nonce, ciphertext) = body.split_at(NONCE_LEN);
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                RefinerError::Encryption("Decryption failed: wrong key or corrupted data".to_string())
            })
    }

    /// Decrypt a sealed file, returning the plaintext
    pub fn decrypt_file(key: &str, path: &Path) -> RefinerResult<Vec<u8>> {
        let sealed = std::fs::read(path).map_err(|e| RefinerError::io(path, e))?;
        Self::decrypt_bytes(key, &sealed)
    }
}

impl FileEncryptor for AesGcmEncryptor {
    fn encrypt(&self, key: &str, path: &Path) -> RefinerResult<PathBuf> {
        // validate the key before touching the file
        Self::cipher(key)?;

        let plaintext = std::fs::read(path).map_err(|e| RefinerError::io(path, e))?;
        let sealed = Self::encrypt_bytes(key, &plaintext)?;

        let target = Self::encrypted_path(path);
        std::fs::write(&target, sealed).map_err(|e| RefinerError::io(&target, e))?;
        debug!("Encrypted {} to {}", path.display(), target.display());
        Ok(target)
    }
}
