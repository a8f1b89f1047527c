//! Application state management for Library Desk.
//!
//! This module contains the core `App` struct: login form state, the book
//! list currently shown, the add/edit form, and the handlers that call
//! `LibraryClient` and turn its results into status messages.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{error, info, warn};

use library_core::{Book, BookDraft, Config, LibraryClient, LibraryError};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for book title and author input.
const MAX_BOOK_FIELD_LENGTH: usize = 200;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Environment variables used to prefill the login form
const USERNAME_ENV: &str = "LIBRARY_USERNAME";
const PASSWORD_ENV: &str = "LIBRARY_PASSWORD";

// ============================================================================
// UI State Types
// ============================================================================

/// Which book screen is shown after login, decided by the role flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Admin,
    User,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Admin => "Book management",
            Screen::User => "Borrow & return",
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    LoggingIn,
    EditingBook,
    ConfirmingDelete,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Book form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Author,
    Borrowed,
    Save,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Title => FormField::Author,
            FormField::Author => FormField::Borrowed,
            FormField::Borrowed => FormField::Save,
            FormField::Save => FormField::Title,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Title => FormField::Save,
            FormField::Author => FormField::Title,
            FormField::Borrowed => FormField::Author,
            FormField::Save => FormField::Borrowed,
        }
    }
}

/// Add/edit form contents. `editing` is the id of the book being edited,
/// or `None` when adding a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct BookForm {
    pub editing: Option<i64>,
    pub title: String,
    pub author: String,
    pub is_borrowed: bool,
    pub focus: FormField,
    pub error: Option<String>,
}

impl BookForm {
    pub fn blank() -> Self {
        Self {
            editing: None,
            title: String::new(),
            author: String::new(),
            is_borrowed: false,
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn for_book(book: &Book) -> Self {
        Self {
            editing: Some(book.id),
            title: book.title.clone(),
            author: book.author.clone(),
            is_borrowed: book.is_borrowed,
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn draft(&self) -> BookDraft {
        BookDraft::new(self.title.trim(), self.author.trim(), self.is_borrowed)
    }

    /// The text field under focus, if any
    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Author => Some(&mut self.author),
            FormField::Borrowed | FormField::Save => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    pub config: Config,
    /// Where `config` is saved after login; `None` disables saving
    config_path: Option<PathBuf>,
    pub client: LibraryClient,

    // UI State
    pub state: AppState,
    pub screen: Screen,
    pub books: Vec<Book>,
    pub selection: usize,
    pub form: BookForm,
    pub status_message: Option<StatusMessage>,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
}

impl App {
    /// Create a new application instance talking to the configured service
    pub fn new(config: Config) -> Result<Self> {
        let client = LibraryClient::new(&config)?;
        let mut app = Self::with_client(config, client);
        app.config_path = Config::default_path().ok();

        // Get credentials from env vars or config
        if let Ok(username) = std::env::var(USERNAME_ENV) {
            app.login_username = username;
        }
        app.login_password = std::env::var(PASSWORD_ENV).unwrap_or_default();

        Ok(app)
    }

    pub fn with_client(config: Config, client: LibraryClient) -> Self {
        let login_username = config.last_username.clone().unwrap_or_default();

        Self {
            config,
            config_path: None,
            client,

            state: AppState::Normal,
            screen: Screen::User,
            books: Vec::new(),
            selection: 0,
            form: BookForm::blank(),
            status_message: None,

            login_username,
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_error: None,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<(), LibraryError> {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            let err = LibraryError::Validation("Username and password required".to_string());
            self.login_error = Some(err.message().to_string());
            return Err(err);
        }

        self.login_error = None;

        match self.client.authenticate(&username, &password).await {
            Ok(()) => {
                self.login_password.clear();
                self.screen = if self.client.is_admin() {
                    Screen::Admin
                } else {
                    Screen::User
                };
                let greeting = match self.screen {
                    Screen::Admin => format!("Welcome admin {}", username),
                    Screen::User => format!("Welcome user {}", username),
                };
                self.set_status(greeting);

                self.config.last_username = Some(username);
                if let Some(ref path) = self.config_path {
                    if let Err(e) = self.config.save_to(path) {
                        warn!(error = %e, "Failed to save config");
                    }
                }

                self.state = AppState::Normal;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let user_message = match e {
                    LibraryError::Authentication(_) => {
                        "Incorrect username or password! Please retry".to_string()
                    }
                    LibraryError::NotFound(ref msg)
                    | LibraryError::Validation(ref msg)
                    | LibraryError::Other(ref msg) => format!("Error while login: {}", msg),
                };
                self.login_error = Some(user_message);
                Err(e)
            }
        }
    }

    /// Drop the session and go back to the login overlay
    pub fn logout(&mut self) {
        self.client.logout();
        self.books.clear();
        self.selection = 0;
        self.login_password.clear();
        self.status_message = None;
        self.start_login();
    }

    // =========================================================================
    // Book operations
    // =========================================================================

    /// Reload the book list from the service
    pub async fn load_books(&mut self) {
        match self.client.list_books().await {
            Ok(books) => {
                info!(count = books.len(), "Book list loaded");
                self.books = books;
                self.clamp_selection();
            }
            Err(e) => self.handle_error(e),
        }
    }

    pub fn open_add_form(&mut self) {
        if self.screen != Screen::Admin {
            return;
        }
        self.form = BookForm::blank();
        self.state = AppState::EditingBook;
    }

    pub fn open_edit_form(&mut self) {
        if self.screen != Screen::Admin {
            return;
        }
        if let Some(book) = self.selected_book() {
            self.form = BookForm::for_book(book);
            self.state = AppState::EditingBook;
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = BookForm::blank();
        self.state = AppState::Normal;
    }

    /// Validate the form and send it as an add or an update
    pub async fn submit_form(&mut self) {
        let draft = self.form.draft();
        if let Err(e) = draft.validate() {
            self.form.error = Some(e.message().to_string());
            return;
        }

        let result = match self.form.editing {
            Some(id) => self.client.update_book(id, &draft).await.map(|()| {
                if let Some(book) = self.books.iter_mut().find(|b| b.id == id) {
                    book.apply(&draft);
                }
                "Book data successfully saved"
            }),
            None => self.client.add_book(&draft).await.map(|id| {
                self.books.push(Book::from_draft(id, draft));
                self.selection = self.books.len() - 1;
                "Book successfully added"
            }),
        };

        match result {
            Ok(message) => {
                self.form = BookForm::blank();
                self.state = AppState::Normal;
                self.set_status(message);
            }
            Err(e) if e.is_authentication() => self.handle_error(e),
            Err(e) => self.form.error = Some(e.to_string()),
        }
    }

    pub fn request_delete(&mut self) {
        if self.screen == Screen::Admin && self.selected_book().is_some() {
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub async fn delete_selected(&mut self) {
        self.state = AppState::Normal;
        let Some(id) = self.selected_book().map(|b| b.id) else {
            return;
        };

        match self.client.delete_book(id).await {
            Ok(()) => {
                self.books.retain(|b| b.id != id);
                self.clamp_selection();
                self.set_status("Book successfully deleted");
            }
            Err(e) => self.handle_error(e),
        }
    }

    pub async fn borrow_selected(&mut self) {
        let Some(book) = self.selected_book() else {
            return;
        };
        if !book.can_borrow() {
            self.set_error("This book is already borrowed");
            return;
        }
        let id = book.id;

        match self.client.borrow_book(id).await {
            Ok(()) => {
                self.set_borrowed(id, true);
                self.set_status("Book successfully borrowed");
            }
            Err(e) => self.handle_error(e),
        }
    }

    pub async fn return_selected(&mut self) {
        let Some(book) = self.selected_book() else {
            return;
        };
        if !book.can_return() {
            self.set_error("This book is not borrowed");
            return;
        }
        let id = book.id;

        match self.client.return_book(id).await {
            Ok(()) => {
                self.set_borrowed(id, false);
                self.set_status("Book successfully returned");
            }
            Err(e) => self.handle_error(e),
        }
    }

    fn set_borrowed(&mut self, id: i64, borrowed: bool) {
        if let Some(book) = self.books.iter_mut().find(|b| b.id == id) {
            book.is_borrowed = borrowed;
        }
    }

    /// Show an operation failure. An authentication failure means the
    /// session is gone, so the user is sent back to the login overlay.
    pub fn handle_error(&mut self, err: LibraryError) {
        warn!(error = %err, "Operation failed");
        match err {
            LibraryError::Authentication(msg) => {
                self.logout();
                self.login_error = Some(msg);
            }
            other @ (LibraryError::NotFound(_)
            | LibraryError::Validation(_)
            | LibraryError::Other(_)) => self.set_error(other.to_string()),
        }
    }

    // =========================================================================
    // Selection & status
    // =========================================================================

    pub fn selected_book(&self) -> Option<&Book> {
        self.books.get(self.selection)
    }

    pub fn select_next(&mut self, step: usize) {
        if !self.books.is_empty() {
            self.selection = (self.selection + step).min(self.books.len() - 1);
        }
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selection = self.selection.saturating_sub(step);
    }

    pub fn select_first(&mut self) {
        self.selection = 0;
    }

    pub fn select_last(&mut self) {
        self.selection = self.books.len().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        self.selection = self.selection.min(self.books.len().saturating_sub(1));
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a title/author character should be accepted
pub fn can_add_book_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_BOOK_FIELD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use library_core::api::transport::testing::ScriptedTransport;

    use super::*;

    const BOOKS: &str = r#"{"books": [
        {"id": 1, "title": "Dune", "author": "Frank Herbert", "is_borrowed": false},
        {"id": 2, "title": "Emma", "author": "Jane Austen", "is_borrowed": true}
    ]}"#;

    fn app() -> (Arc<ScriptedTransport>, App) {
        let transport = Arc::new(ScriptedTransport::new());
        let client = LibraryClient::with_transport(transport.clone());
        (transport, App::with_client(Config::default(), client))
    }

    async fn logged_in(is_admin: bool) -> (Arc<ScriptedTransport>, App) {
        let (transport, mut app) = app();
        transport.push_response(
            200,
            &format!(
                r#"{{"token": "t", "expires_in_sec": 3600, "is_admin": {}}}"#,
                is_admin
            ),
        );
        transport.push_response(200, BOOKS);
        app.login_username = "carlo".to_string();
        app.login_password = "bianchi".to_string();
        app.attempt_login().await.unwrap();
        app.load_books().await;
        (transport, app)
    }

    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_login_routes_user_screen() {
        let (_, app) = logged_in(false).await;
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.screen, Screen::User);
        assert_eq!(app.books.len(), 2);
        assert!(app.login_password.is_empty());
        assert_eq!(app.config.last_username.as_deref(), Some("carlo"));
        assert_eq!(
            app.status_message.as_ref().map(|s| s.text.as_str()),
            Some("Welcome user carlo")
        );
    }

    #[tokio::test]
    async fn test_login_routes_admin_screen() {
        let (_, app) = logged_in(true).await;
        assert_eq!(app.screen, Screen::Admin);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields_without_io() {
        let (transport, mut app) = app();
        app.start_login();
        app.login_username = "carlo".to_string();

        assert!(app.attempt_login().await.is_err());
        assert_eq!(
            app.login_error.as_deref(),
            Some("Username and password required")
        );
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_login_wrong_credentials_message() {
        let (transport, mut app) = app();
        transport.push_response(401, "");
        app.start_login();
        app.login_username = "wrong_user".to_string();
        app.login_password = "wrong_password".to_string();

        assert!(app.attempt_login().await.is_err());
        assert_eq!(
            app.login_error.as_deref(),
            Some("Incorrect username or password! Please retry")
        );
        assert_eq!(app.state, AppState::LoggingIn);
    }

    #[tokio::test]
    async fn test_login_other_failure_message() {
        let (transport, mut app) = app();
        transport.push_error(LibraryError::Other("Connection timed out".to_string()));
        app.login_username = "carlo".to_string();
        app.login_password = "bianchi".to_string();

        assert!(app.attempt_login().await.is_err());
        assert_eq!(
            app.login_error.as_deref(),
            Some("Error while login: Connection timed out")
        );
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let (_, mut app) = logged_in(true).await;
        app.logout();
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.login_focus, LoginFocus::Password);
        assert!(app.books.is_empty());
        assert!(!app.is_authenticated());
    }

    #[tokio::test]
    async fn test_server_rejected_token_returns_to_login() {
        let (transport, mut app) = logged_in(false).await;
        transport.push_response(401, "token expired");

        app.borrow_selected().await;

        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.login_error.is_some());
        assert!(!app.is_authenticated());
    }

    // -------------------------------------------------------------------------
    // Admin screen
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_add_book_appends_and_selects() {
        let (transport, mut app) = logged_in(true).await;
        app.open_add_form();
        assert_eq!(app.state, AppState::EditingBook);
        app.form.title = "Il Gattopardo".to_string();
        app.form.author = "Giuseppe Tomasi di Lampedusa".to_string();

        transport.push_response(201, r#"{"book_id": 9}"#);
        app.submit_form().await;

        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.books.len(), 3);
        assert_eq!(app.selected_book().map(|b| b.id), Some(9));
        assert_eq!(
            app.status_message.as_ref().map(|s| s.text.as_str()),
            Some("Book successfully added")
        );
    }

    #[tokio::test]
    async fn test_submit_blank_form_is_rejected_locally() {
        let (transport, mut app) = logged_in(true).await;
        let before = transport.request_count();

        app.open_add_form();
        app.form.title = "  ".to_string();
        app.submit_form().await;

        assert_eq!(app.state, AppState::EditingBook);
        assert_eq!(
            app.form.error.as_deref(),
            Some("Title and Author cannot be empty.")
        );
        assert_eq!(transport.request_count(), before);
    }

    #[tokio::test]
    async fn test_edit_book_updates_row() {
        let (transport, mut app) = logged_in(true).await;
        app.open_edit_form();
        assert_eq!(app.form.editing, Some(1));
        app.form.title = "Dune Messiah".to_string();
        app.form.is_borrowed = true;

        transport.push_response(200, "");
        app.submit_form().await;

        assert_eq!(app.books[0].title, "Dune Messiah");
        assert!(app.books[0].is_borrowed);
        assert_eq!(transport.requests().last().map(|r| r.path.as_str()), Some("/books/1"));
    }

    #[tokio::test]
    async fn test_edit_missing_book_keeps_form_open() {
        let (transport, mut app) = logged_in(true).await;
        app.open_edit_form();
        transport.push_response(404, "Book not found");
        app.submit_form().await;

        assert_eq!(app.state, AppState::EditingBook);
        assert_eq!(
            app.form.error.as_deref(),
            Some("Resource not found: Book not found")
        );
    }

    #[tokio::test]
    async fn test_delete_book() {
        let (transport, mut app) = logged_in(true).await;
        app.select_last();
        app.request_delete();
        assert_eq!(app.state, AppState::ConfirmingDelete);

        transport.push_response(200, "");
        app.delete_selected().await;

        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.books.len(), 1);
        assert_eq!(app.selection, 0);
    }

    #[tokio::test]
    async fn test_user_cannot_open_admin_actions() {
        let (_, mut app) = logged_in(false).await;
        app.open_add_form();
        app.open_edit_form();
        app.request_delete();
        assert_eq!(app.state, AppState::Normal);
    }

    // -------------------------------------------------------------------------
    // User screen
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_borrow_then_return() {
        let (transport, mut app) = logged_in(false).await;
        transport.push_response(200, "");
        transport.push_response(200, "");

        app.borrow_selected().await;
        assert!(app.books[0].is_borrowed);
        app.return_selected().await;
        assert!(!app.books[0].is_borrowed);

        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths[2..], ["/books/1/borrow", "/books/1/return"]);
    }

    #[tokio::test]
    async fn test_borrow_already_borrowed_skips_request() {
        let (transport, mut app) = logged_in(false).await;
        app.select_next(1);
        let before = transport.request_count();

        app.borrow_selected().await;

        assert_eq!(transport.request_count(), before);
        assert!(app.status_message.as_ref().is_some_and(|s| s.is_error));
    }

    #[tokio::test]
    async fn test_failed_borrow_shows_error() {
        let (transport, mut app) = logged_in(false).await;
        transport.push_response(409, "already borrowed");
        app.borrow_selected().await;

        assert!(!app.books[0].is_borrowed);
        let status = app.status_message.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("already borrowed"));
    }

    // -------------------------------------------------------------------------
    // Selection & form helpers
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_selection_bounds() {
        let (_, mut app) = logged_in(false).await;
        app.select_next(PAGE_SCROLL_SIZE);
        assert_eq!(app.selection, 1);
        app.select_prev(PAGE_SCROLL_SIZE);
        assert_eq!(app.selection, 0);
    }

    #[test]
    fn test_form_field_cycle() {
        assert_eq!(FormField::Title.next(), FormField::Author);
        assert_eq!(FormField::Save.next(), FormField::Title); // Wraps around
        assert_eq!(FormField::Title.prev(), FormField::Save);
        assert_eq!(FormField::Borrowed.prev(), FormField::Author);
    }

    #[test]
    fn test_form_draft_trims() {
        let mut form = BookForm::blank();
        form.title = "  Dune ".to_string();
        form.author = "Frank Herbert ".to_string();
        assert_eq!(form.draft(), BookDraft::new("Dune", "Frank Herbert", false));
        form.focus = FormField::Borrowed;
        assert!(form.focused_text_mut().is_none());
    }

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\x00'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[test]
    fn test_can_add_book_field_char() {
        assert!(can_add_book_field_char(0, 'è'));
        assert!(!can_add_book_field_char(MAX_BOOK_FIELD_LENGTH, 'a'));
        assert!(!can_add_book_field_char(0, '\t'));
    }
}
