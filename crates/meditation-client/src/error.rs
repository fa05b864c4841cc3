use thiserror::Error;

/// Failure taxonomy for API calls made by the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Transport failure or an unreadable response.
    #[error("network error: {0}")]
    Network(String),
    /// The server rejected the bearer token (HTTP 401).
    #[error("session expired")]
    Auth,
    /// The server rejected the request payload.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("server error: {0}")]
    Server(String),
}

impl ClientError {
    /// Map a non-success HTTP status and its `message` body to an error.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("request failed with {status}"));
        match status {
            401 => ClientError::Auth,
            404 => ClientError::NotFound(message),
            400..=499 => ClientError::Validation(message),
            _ => ClientError::Server(message),
        }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => "Network error. Please try again.".to_string(),
            ClientError::Auth => "Session expired. Please login again.".to_string(),
            ClientError::Validation(msg) | ClientError::NotFound(msg) => msg.clone(),
            ClientError::Server(_) => "Server error. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_variants() {
        assert_eq!(ClientError::from_status(401, None), ClientError::Auth);
        assert_eq!(
            ClientError::from_status(404, Some("Meditation not found".into())),
            ClientError::NotFound("Meditation not found".into())
        );
        assert_eq!(
            ClientError::from_status(400, Some("User already exists".into())),
            ClientError::Validation("User already exists".into())
        );
        assert_eq!(
            ClientError::from_status(503, None),
            ClientError::Server("request failed with 503".into())
        );
    }

    #[test]
    fn user_messages_hide_transport_details() {
        let err = ClientError::Network("connection refused".into());
        assert_eq!(err.user_message(), "Network error. Please try again.");
        assert_eq!(
            ClientError::Validation("Invalid credentials".into()).user_message(),
            "Invalid credentials"
        );
    }
}
