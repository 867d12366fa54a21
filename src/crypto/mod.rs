//! Payload crypto for outbound API requests.

pub mod aes;
pub mod envelope;

pub use envelope::{Envelope, EnvelopeError, PayloadCipher, DEFAULT_PAYLOAD_SECRET};
