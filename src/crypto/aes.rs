//! AES-256-GCM sealing for request payloads.
//!
//! Sealed format: IV (12 bytes) || Ciphertext || Auth Tag (16 bytes)

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// AES-256-GCM key size in bytes (256 bits).
pub const AES_KEY_SIZE: usize = 32;

/// AES-GCM IV size in bytes (96 bits).
pub const AES_IV_SIZE: usize = 12;

/// AES-GCM authentication tag size in bytes (128 bits).
pub const AES_TAG_SIZE: usize = 16;

const MIN_SEALED_SIZE: usize = AES_IV_SIZE + AES_TAG_SIZE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AesError {
    #[error("Seal failed")]
    SealFailed,
    #[error("Open failed")]
    OpenFailed,
    #[error("Sealed data too short ({0} bytes)")]
    TooShort(usize),
}

/// Derive the 32-byte payload key from a pre-shared secret string.
pub fn derive_key(secret: &str) -> [u8; AES_KEY_SIZE] {
    let digest = Sha256::digest(secret.as_bytes());
    let mut key = [0u8; AES_KEY_SIZE];
    key.copy_from_slice(&digest);
    key
}

/// Generate a random 12-byte IV.
pub fn generate_iv() -> [u8; AES_IV_SIZE] {
    let mut iv = [0u8; AES_IV_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut iv);
    iv
}

/// Seal `plaintext` under `key` with a freshly generated IV.
pub fn seal(plaintext: &[u8], key: &[u8; AES_KEY_SIZE]) -> Result<Vec<u8>, AesError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| AesError::SealFailed)?;
    let iv = generate_iv();
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| AesError::SealFailed)?;

    let mut sealed = Vec::with_capacity(AES_IV_SIZE + ciphertext.len());
    sealed.extend_from_slice(&iv);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Open data produced by [`seal`].
pub fn open(sealed: &[u8], key: &[u8; AES_KEY_SIZE]) -> Result<Vec<u8>, AesError> {
    if sealed.len() < MIN_SEALED_SIZE {
        return Err(AesError::TooShort(sealed.len()));
    }

    let (iv, ciphertext) = sealed.split_at(AES_IV_SIZE);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| AesError::OpenFailed)?;
    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| AesError::OpenFailed)
}
