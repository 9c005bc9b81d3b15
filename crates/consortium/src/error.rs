use rimp_client::ClientError;
use rimp_models::GENERIC_ERROR;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsortiumError>;

#[derive(Debug, Error)]
pub enum ConsortiumError {
    /// The store could not be reached or answered garbage
    #[error("Transport error: {0}")]
    Transport(String),

    /// The store answered `success: false`
    #[error("{0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConsortiumError {
    /// Text shown to the user. Transport details go to the log, not the alert.
    pub fn user_message(&self) -> String {
        match self {
            ConsortiumError::Transport(_) => GENERIC_ERROR.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ClientError> for ConsortiumError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api(message) => ConsortiumError::Rejected(message),
            other => ConsortiumError::Transport(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ConsortiumError {
    fn from(err: validator::ValidationErrors) -> Self {
        ConsortiumError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_failure_is_surfaced_verbatim() {
        let err: ConsortiumError = ClientError::Api("year is closed".to_string()).into();
        assert_eq!(err.user_message(), "year is closed");
    }

    #[test]
    fn test_transport_failure_uses_generic_message() {
        let err: ConsortiumError = ClientError::MissingData("Create organization").into();
        assert!(matches!(err, ConsortiumError::Transport(_)));
        assert_eq!(err.user_message(), GENERIC_ERROR);
    }
}
