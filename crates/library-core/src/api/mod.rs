//! REST API client module for the library-management service.
//!
//! This module provides the `LibraryClient` for logging in and for the
//! book operations (list, add, update, delete, borrow, return), the
//! `Transport` seam it sends requests through, and the `LibraryError`
//! taxonomy every operation reports.
//!
//! The service uses bearer token authentication obtained through
//! `POST /auth/login`.

pub mod client;
pub mod error;
pub mod transport;

pub use client::LibraryClient;
pub use error::LibraryError;
pub use transport::{ApiRequest, ApiResponse, HttpMethod, RequestBody, ReqwestTransport, Transport};
