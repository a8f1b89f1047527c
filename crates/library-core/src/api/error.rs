use thiserror::Error;

/// Every failure a `LibraryClient` operation can report.
///
/// The set is closed: callers match on it exhaustively and show
/// the message to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// Bad credentials, a missing or expired session, or a 401 from the server.
    #[error("{0}")]
    Authentication(String),

    /// A 404 on an identified resource.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A payload the server rejected (400 and every other 4xx/5xx).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Anything else: transport failures, unexpected statuses, bad JSON.
    #[error("{0}")]
    Other(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl LibraryError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Classify a non-success HTTP status.
    ///
    /// This is the single place where status codes become error kinds;
    /// every resource operation goes through it.
    pub fn from_status(status: u16, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status {
            401 => LibraryError::Authentication(if truncated.is_empty() {
                "Unauthorized - token may be expired".to_string()
            } else {
                format!("Unauthorized: {}", truncated)
            }),
            404 => LibraryError::NotFound(truncated),
            400.. => LibraryError::Validation(format!("status {}: {}", status, truncated)),
            _ => LibraryError::Other(format!("Unexpected response status {}: {}", status, truncated)),
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, LibraryError::Authentication(_))
    }

    /// The bare message, without the kind prefix `Display` adds.
    pub fn message(&self) -> &str {
        match self {
            LibraryError::Authentication(msg)
            | LibraryError::NotFound(msg)
            | LibraryError::Validation(msg)
            | LibraryError::Other(msg) => msg,
        }
    }
}

impl From<reqwest::Error> for LibraryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LibraryError::Other("Connection timed out. Please try again.".to_string())
        } else if err.is_connect() {
            LibraryError::Other(format!("Unable to connect to server: {}", err))
        } else {
            LibraryError::Other(format!("Network error: {}", err))
        }
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::Other(format!("Invalid response: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_unauthorized() {
        let err = LibraryError::from_status(401, "");
        assert!(err.is_authentication());
        assert_eq!(err.to_string(), "Unauthorized - token may be expired");
    }

    #[test]
    fn test_from_status_not_found() {
        let err = LibraryError::from_status(404, "no book with id -1");
        assert_eq!(err, LibraryError::NotFound("no book with id -1".to_string()));
    }

    #[test]
    fn test_from_status_other_client_errors_are_validation() {
        for status in [400, 403, 409, 422, 500, 503, 600, 999] {
            let err = LibraryError::from_status(status, "{\"error\":\"bad\"}");
            match err {
                LibraryError::Validation(msg) => {
                    assert!(msg.contains("{\"error\":\"bad\"}"), "body missing for {}", status);
                    assert!(msg.contains(&status.to_string()));
                }
                other => panic!("status {} mapped to {:?}", status, other),
            }
        }
    }

    #[test]
    fn test_from_status_below_400_is_other() {
        assert!(matches!(LibraryError::from_status(302, ""), LibraryError::Other(_)));
    }

    #[test]
    fn test_truncate_body_long() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 100);
        let err = LibraryError::from_status(404, &body);
        let msg = err.message();
        assert!(msg.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(msg.ends_with("(truncated, 600 total bytes)"));
    }

    #[test]
    fn test_truncate_body_respects_char_boundary() {
        // byte 500 falls inside a two-byte 'é'
        let body = format!("a{}", "é".repeat(250));
        let err = LibraryError::from_status(404, &body);
        assert!(err.message().contains("truncated"));
    }

    #[test]
    fn test_message_strips_prefix() {
        let err = LibraryError::Validation("Title and Author cannot be empty.".to_string());
        assert_eq!(err.message(), "Title and Author cannot be empty.");
        assert_eq!(err.to_string(), "Validation error: Title and Author cannot be empty.");
    }
}
