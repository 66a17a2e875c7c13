//! REST transport for the vehicle-service admin API.
//!
//! This module provides the `Transport` seam used by every resource client
//! and `ApiClient`, its reqwest implementation. The API uses bearer token
//! authentication obtained through the admin login endpoint.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{ApiClient, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::ApiError;
pub use transport::{decode, FilePart, HttpRequest, HttpUpload, Method, Transport};
