//! Session management for the library service.
//!
//! This module provides `Session`: the in-memory bearer token, its
//! client-local expiry and the role flag returned at login. Sessions are
//! never written to disk; a restart means logging in again.

pub mod session;

pub use session::Session;
