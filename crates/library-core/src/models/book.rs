use serde::{Deserialize, Serialize};

use crate::api::LibraryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub is_borrowed: bool,
}

impl Book {
    pub fn from_draft(id: i64, draft: BookDraft) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            is_borrowed: draft.is_borrowed,
        }
    }

    /// Overwrite the editable fields after a successful update.
    pub fn apply(&mut self, draft: &BookDraft) {
        self.title = draft.title.clone();
        self.author = draft.author.clone();
        self.is_borrowed = draft.is_borrowed;
    }

    pub fn borrowed_label(&self) -> &'static str {
        if self.is_borrowed {
            "yes"
        } else {
            "no"
        }
    }

    pub fn can_borrow(&self) -> bool {
        !self.is_borrowed
    }

    pub fn can_return(&self) -> bool {
        self.is_borrowed
    }
}

/// Payload for creating or updating a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub is_borrowed: bool,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>, is_borrowed: bool) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            is_borrowed,
        }
    }

    /// Local check run by the UI before submitting.
    pub fn validate(&self) -> Result<(), LibraryError> {
        if self.title.trim().is_empty() || self.author.trim().is_empty() {
            return Err(LibraryError::Validation(
                "Title and Author cannot be empty.".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&Book> for BookDraft {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            is_borrowed: book.is_borrowed,
        }
    }
}

/// `GET /books` response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct BooksResponse {
    pub books: Vec<Book>,
}

/// `POST /books` response
#[derive(Debug, Deserialize)]
pub(crate) struct NewBookResponse {
    pub book_id: i64,
}
