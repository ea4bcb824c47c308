//! API error types for the Extra Memory client.

use reqwest::StatusCode;
use thiserror::Error;

/// The endpoint a failed request was made against.
///
/// Some status codes mean different things depending on the endpoint, so the
/// status mapping takes this into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `POST /signin`.
    Signin,
    /// `POST /signup`.
    Signup,
    /// `GET /brain/:userId`.
    SharedBrain,
    /// Every other endpoint.
    Other,
}

/// Errors that can occur when talking to the Extra Memory backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No token is stored; the user has to sign in first.
    #[error("No authentication token found. Please sign in.")]
    MissingToken,

    /// The token was rejected.
    #[error("Session expired or invalid: please sign in again")]
    Unauthorized,

    /// Sign-in was rejected for the given username/password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Sign-up was rejected because the name is in use.
    #[error("Username already exists")]
    UsernameTaken,

    /// The requested brain is not shared.
    #[error("This brain is not shared or the link is invalid")]
    NotShared,

    /// Permission denied.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Backend server error.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// The response status.
        status: u16,
        /// Message from the error body, or the URL.
        message: String,
    },

    /// The request could not be sent or the connection dropped.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Invalid backend URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Keyring error when storing/retrieving tokens.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// The request was cancelled on purpose. Never shown to the user.
    #[error("Request aborted")]
    Aborted,
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code.
    ///
    /// `message` is the backend's `{message}` body when present, otherwise
    /// the request URL.
    pub fn from_status(status: StatusCode, endpoint: Endpoint, message: &str) -> Self {
        match (endpoint, status.as_u16()) {
            (Endpoint::Signin, 403 | 404) => ApiError::InvalidCredentials,
            (Endpoint::Signup, 403 | 409) => ApiError::UsernameTaken,
            (Endpoint::SharedBrain, 403 | 404) => ApiError::NotShared,
            (_, 401) => ApiError::Unauthorized,
            (_, 403) => ApiError::Forbidden(message.to_string()),
            (_, 404) => ApiError::NotFound(message.to_string()),
            (_, 500..=599) => ApiError::ServerError(format!("HTTP {}: {}", status, message)),
            (_, code) => ApiError::Http {
                status: code,
                message: message.to_string(),
            },
        }
    }

    /// Whether this error is an intentional cancellation.
    pub fn is_aborted(&self) -> bool {
        matches!(self, ApiError::Aborted)
    }

    /// Whether the session is gone and the user has to sign in again.
    pub fn requires_signin(&self) -> bool {
        matches!(self, ApiError::MissingToken | ApiError::Unauthorized)
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::ServerError(_) | ApiError::Network(_))
    }

    /// A short message suitable for a toast or an inline error line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "Unable to connect to server. Please check if the backend is running.".to_string()
            }
            ApiError::ServerError(_) => "Server error. Please try again later.".to_string(),
            ApiError::InvalidResponse(_) => {
                "Unexpected response from the server. Please try again.".to_string()
            }
            ApiError::Forbidden(msg) | ApiError::NotFound(msg) => msg.clone(),
            ApiError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signin_403_and_404_are_invalid_credentials() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, Endpoint::Signin, "x");
        assert!(matches!(err, ApiError::InvalidCredentials));
        let err = ApiError::from_status(StatusCode::NOT_FOUND, Endpoint::Signin, "x");
        assert!(matches!(err, ApiError::InvalidCredentials));
    }

    #[test]
    fn test_signup_403_is_username_taken() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, Endpoint::Signup, "x");
        assert!(matches!(err, ApiError::UsernameTaken));
    }

    #[test]
    fn test_shared_brain_403_is_not_shared() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, Endpoint::SharedBrain, "x");
        assert!(matches!(err, ApiError::NotShared));
    }

    #[test]
    fn test_generic_403_keeps_message() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, Endpoint::Other, "not yours");
        match err {
            ApiError::Forbidden(msg) => assert_eq!(msg, "not yours"),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_error_from_status_401() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, Endpoint::Other, "x");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_error_from_status_500() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, Endpoint::Other, "x");
        assert!(matches!(err, ApiError::ServerError(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_error_from_status_other() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, Endpoint::Other, "bad title");
        match &err {
            ApiError::Http { status, message } => {
                assert_eq!(*status, 400);
                assert_eq!(message, "bad title");
            }
            other => panic!("Expected Http, got {:?}", other),
        }
        assert_eq!(err.user_message(), "bad title");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_aborted() {
        assert!(ApiError::Aborted.is_aborted());
        assert!(!ApiError::Unauthorized.is_aborted());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ApiError::MissingToken.to_string(),
            "No authentication token found. Please sign in."
        );
        assert_eq!(
            ApiError::NotShared.user_message(),
            "This brain is not shared or the link is invalid"
        );
    }
}
