//! API client for the library-management REST service.
//!
//! `LibraryClient` owns the login session and exposes the book
//! operations. Every authenticated call checks the local expiry first and
//! funnels through one dispatch routine that attaches the bearer token and
//! classifies the response status.

use std::sync::Arc;

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, info, warn};

use crate::auth::Session;
use crate::config::Config;
use crate::models::{Book, BookDraft, BooksResponse, NewBookResponse};

use super::transport::{ApiRequest, ApiResponse, HttpMethod, ReqwestTransport, Transport};
use super::LibraryError;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    expires_in_sec: i64,
    #[serde(default)]
    is_admin: bool,
}

/// Client for the library service.
///
/// Not meant to be shared between concurrent callers: `authenticate`
/// takes `&mut self`, so the session can only change when nothing else
/// holds the client.
pub struct LibraryClient {
    transport: Arc<dyn Transport>,
    session: Session,
}

impl LibraryClient {
    /// Create a client talking to the configured service
    pub fn new(config: &Config) -> Result<Self, LibraryError> {
        let transport = ReqwestTransport::new(&config.base_url, config.request_timeout_secs)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    /// Log in and replace the session.
    ///
    /// The new session is only installed once the whole response has been
    /// parsed, so a failed login leaves the previous session as it was.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<(), LibraryError> {
        let request = ApiRequest::new(HttpMethod::Post, "/auth/login")
            .form(&[("username", username), ("password", password)]);

        let requested_at = Utc::now();
        let response = self.transport.send(request).await?;

        let response = match response.status {
            401 => {
                warn!("Login rejected");
                return Err(LibraryError::Authentication(
                    "Wrong username or password".to_string(),
                ));
            }
            400 => {
                return Err(LibraryError::Validation(
                    "Something wrong in message sent to server".to_string(),
                ));
            }
            _ => check_response(response)?,
        };

        let login: LoginResponse = parse_body(&response)?;
        self.session = Session::issue(login.token, login.expires_in_sec, login.is_admin, requested_at);
        info!(
            is_admin = self.session.is_admin(),
            expires_at = %self.session.expires_at(),
            "Login successful"
        );
        Ok(())
    }

    /// Forget the session locally. The server is not contacted.
    pub fn logout(&mut self) {
        if self.session.token().is_some() {
            info!("Session cleared");
        }
        self.session = Session::default();
    }

    // ===== Book Operations =====

    pub async fn list_books(&self) -> Result<Vec<Book>, LibraryError> {
        let response = self.send(HttpMethod::Get, "/books", None).await?;
        let parsed: BooksResponse = parse_body(&response)?;
        debug!(count = parsed.books.len(), "Fetched books");
        Ok(parsed.books)
    }

    /// Create a book and return the id the server assigned
    pub async fn add_book(&self, draft: &BookDraft) -> Result<i64, LibraryError> {
        let body = serde_json::to_value(draft)?;
        let response = self.send(HttpMethod::Post, "/books", Some(body)).await?;
        let created: NewBookResponse = parse_body(&response)?;
        info!(book_id = created.book_id, "Book added");
        Ok(created.book_id)
    }

    pub async fn update_book(&self, id: i64, draft: &BookDraft) -> Result<(), LibraryError> {
        let body = serde_json::to_value(draft)?;
        self.send(HttpMethod::Put, &format!("/books/{}", id), Some(body))
            .await?;
        info!(book_id = id, "Book updated");
        Ok(())
    }

    pub async fn delete_book(&self, id: i64) -> Result<(), LibraryError> {
        self.send(HttpMethod::Delete, &format!("/books/{}", id), None)
            .await?;
        info!(book_id = id, "Book deleted");
        Ok(())
    }

    pub async fn borrow_book(&self, id: i64) -> Result<(), LibraryError> {
        self.send(HttpMethod::Post, &format!("/books/{}/borrow", id), None)
            .await?;
        info!(book_id = id, "Book borrowed");
        Ok(())
    }

    pub async fn return_book(&self, id: i64) -> Result<(), LibraryError> {
        self.send(HttpMethod::Post, &format!("/books/{}/return", id), None)
            .await?;
        info!(book_id = id, "Book returned");
        Ok(())
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse, LibraryError> {
        dispatch(self.transport.as_ref(), &self.session, method, path, body).await
    }
}

/// Shared routine behind every authenticated operation: expiry guard,
/// bearer header, one request, status classification.
async fn dispatch(
    transport: &dyn Transport,
    session: &Session,
    method: HttpMethod,
    path: &str,
    body: Option<serde_json::Value>,
) -> Result<ApiResponse, LibraryError> {
    let token = session.ensure_authenticated()?;

    let mut request = ApiRequest::new(method, path).bearer(token);
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = transport.send(request).await?;
    check_response(response).inspect_err(|e| {
        warn!(?method, path, error = %e, "Request failed");
    })
}

/// Check if response is successful, returning a classified error if not.
fn check_response(response: ApiResponse) -> Result<ApiResponse, LibraryError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(LibraryError::from_status(response.status, &response.body))
    }
}

fn parse_body<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, LibraryError> {
    serde_json::from_str(&response.body).map_err(LibraryError::from)
}
