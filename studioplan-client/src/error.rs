/// Client error types
///
/// Every accessor surfaces failures as a [`ClientError`]; the `Api` variant
/// carries the server's `{"error": ...}` message so views can show it as-is.

/// Client error types
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure or undecodable response
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status with the server's message
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Caller input rejected before any request
    #[error("Invalid input: {0}")]
    Invalid(String),

    /// The record the caller referred to is not loaded locally
    #[error("{0} is not loaded")]
    NotLoaded(String),
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ClientError::Api {
            status,
            message: message.into(),
        }
    }

    /// Status code for `Api` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Client result type alias
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_server_message() {
        let err = ClientError::api(400, "Title is required");
        assert_eq!(err.to_string(), "Title is required");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_not_found());
        assert!(ClientError::api(404, "Note not found").is_not_found());
    }
}
