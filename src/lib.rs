//! Client library for the clinic management backend.
//!
//! Provides the authenticated request wrapper (bearer + locale headers,
//! Encrypted Envelope bodies, one-shot refresh and retry on 401), the session
//! and its persisted credentials, and typed helpers for the clinic endpoints.

pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ApiResponse, RequestOptions};
pub use config::ClientConfig;
pub use error::ApiError;
pub use events::{AuthEvent, AuthEvents};
pub use session::{CredentialPair, Session};
