//! Utility functions for string formatting.

pub mod format;

pub use format::{pad_to_width, truncate_string};
