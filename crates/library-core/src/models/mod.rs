//! Data models for library entities.
//!
//! - `Book`: a book as the service returns it
//! - `BookDraft`: the add/update payload

pub mod book;

pub use book::{Book, BookDraft};
pub(crate) use book::{BooksResponse, NewBookResponse};
