//! Encrypted Envelope for outbound JSON bodies.
//!
//! A JSON body is serialized, sealed with AES-256-GCM under a key derived from
//! a pre-shared secret, base64-encoded, and sent as `{"payload": "<ciphertext>"}`.
//!
//! The secret ships with every client, so this only hides payloads from casual
//! inspection. It is not a confidentiality boundary.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::aes::{self, AesError, AES_KEY_SIZE};

/// Secret used when `CLINIC_PAYLOAD_SECRET` is not configured.
pub const DEFAULT_PAYLOAD_SECRET: &str = "clinic-payload-v1";

/// Inline file fields longer than this many characters are sent unencrypted.
pub const INLINE_FILE_LIMIT: usize = 200_000;

/// Top-level body field that carries inline base64 file content.
pub const INLINE_FILE_FIELD: &str = "fileData";

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Cipher failure: {0}")]
    Cipher(#[from] AesError),
    #[error("Invalid base64 payload")]
    InvalidEncoding,
}

/// Wire shape replacing a plaintext JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub payload: String,
}

/// Payload cipher holding the derived key. The key is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PayloadCipher {
    key: [u8; AES_KEY_SIZE],
}

impl PayloadCipher {
    pub fn new(secret: &str) -> Self {
        Self {
            key: aes::derive_key(secret),
        }
    }

    /// Serialize `value` to JSON and return the base64 ciphertext.
    pub fn encrypt<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, EnvelopeError> {
        let mut json = serde_json::to_vec(value)?;
        let sealed = aes::seal(&json, &self.key);
        json.zeroize();
        Ok(STANDARD.encode(sealed?))
    }

    /// Wrap `value` in an [`Envelope`].
    pub fn seal_envelope<T: Serialize + ?Sized>(&self, value: &T) -> Result<Envelope, EnvelopeError> {
        Ok(Envelope {
            payload: self.encrypt(value)?,
        })
    }

    /// Reverse [`PayloadCipher::encrypt`] back into a JSON value.
    pub fn decrypt(&self, ciphertext: &str) -> Result<Value, EnvelopeError> {
        let sealed = STANDARD
            .decode(ciphertext)
            .map_err(|_| EnvelopeError::InvalidEncoding)?;
        let mut json = aes::open(&sealed, &self.key)?;
        let value: Result<Value, _> = serde_json::from_slice(&json);
        json.zeroize();
        Ok(value?)
    }
}

impl std::fmt::Debug for PayloadCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadCipher").finish_non_exhaustive()
    }
}

/// Whether `path` addresses a file-upload endpoint, whose bodies are never enveloped.
pub fn is_upload_path(path: &str) -> bool {
    path.to_ascii_lowercase().contains("/upload")
}

/// Whether the body carries an inline file too large to envelope.
pub fn has_oversized_inline_file(body: &Value) -> bool {
    body.get(INLINE_FILE_FIELD)
        .and_then(Value::as_str)
        .is_some_and(|data| data.chars().count() > INLINE_FILE_LIMIT)
}
