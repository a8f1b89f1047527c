//! Core library for library-desk.
//!
//! Provides the authenticated client for the library-management REST
//! service, the in-memory session, the book models and the application
//! configuration. The terminal front end lives in `library-tui`.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{LibraryClient, LibraryError};
pub use auth::Session;
pub use config::Config;
pub use models::{Book, BookDraft};
