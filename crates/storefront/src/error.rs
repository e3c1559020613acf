//! Login error handling.
//!
//! Login is the one flow where the message shown to the user depends on how
//! the backend failed: a structured refusal keeps the credentials wording,
//! anything else gets the generic retry wording.

use marketplace_core::EmailError;
use thiserror::Error;

use crate::api::ApiError;
use crate::session::StorageError;

/// Shown when the backend refuses the credentials without a message.
pub const LOGIN_REJECTED: &str = "Login failed. Please check your credentials.";

/// Shown when the login request itself failed without a message.
pub const LOGIN_FAILED: &str = "An error occurred during login. Please try again.";

/// Errors returned by [`crate::Storefront::login`].
#[derive(Debug, Error)]
pub enum LoginError {
    /// The email address is malformed; no request was sent.
    #[error("Invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The backend answered but did not issue a credential.
    #[error("{}", .message.as_deref().unwrap_or(LOGIN_REJECTED))]
    Rejected { message: Option<String> },

    /// The request failed or was refused with an error status.
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: ApiError,
    },

    /// The credential was issued but could not be saved.
    #[error("Failed to save session: {0}")]
    Storage(#[from] StorageError),
}

impl LoginError {
    /// Classify a gateway failure.
    ///
    /// A 2xx response with `success: false` is a refusal; everything else
    /// (401, 5xx, transport) is a failed attempt.
    #[must_use]
    pub fn from_api(error: ApiError) -> Self {
        match error {
            ApiError::Rejected { status, message } if (200..300).contains(&status) => {
                Self::Rejected { message }
            }
            source => Self::Failed {
                message: source.server_message().unwrap_or(LOGIN_FAILED).to_string(),
                source,
            },
        }
    }
}

impl From<ApiError> for LoginError {
    fn from(error: ApiError) -> Self {
        Self::from_api(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_false_uses_credentials_wording() {
        let err = LoginError::from_api(ApiError::Rejected {
            status: 200,
            message: None,
        });
        assert_eq!(err.to_string(), LOGIN_REJECTED);

        let err = LoginError::from_api(ApiError::Rejected {
            status: 200,
            message: Some("Account locked".to_string()),
        });
        assert_eq!(err.to_string(), "Account locked");
    }

    #[test]
    fn test_error_status_prefers_server_message() {
        let err = LoginError::from_api(ApiError::Unauthorized {
            message: Some("Invalid email or password".to_string()),
        });
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(matches!(err, LoginError::Failed { .. }));
    }

    #[test]
    fn test_error_without_message_uses_generic_wording() {
        let err = LoginError::from_api(ApiError::Rejected {
            status: 500,
            message: None,
        });
        assert_eq!(err.to_string(), LOGIN_FAILED);

        let err = LoginError::from_api(ApiError::EmptyResponse);
        assert_eq!(err.to_string(), LOGIN_FAILED);
    }
}
