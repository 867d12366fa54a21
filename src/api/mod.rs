//! API client for the clinic backend.
//!
//! [`client::ApiClient`] is the single entry point for outbound calls. The
//! per-screen modules are thin typed wrappers over it.

pub mod appointments;
pub mod auth;
pub mod catalog;
pub mod client;
pub mod endpoints;
pub mod hospitals;
pub mod notifications;
pub mod patients;
pub mod refresh;
pub mod transport;
pub mod types;
pub mod users;


pub use client::{ApiClient, ApiResponse, RequestOptions};
pub use refresh::RefreshOutcome;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport, TransportError};
