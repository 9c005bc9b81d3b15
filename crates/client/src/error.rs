use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a usable HTTP response
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with `success: false`
    #[error("{0}")]
    Api(String),

    #[error("Response is missing {0}")]
    MissingData(&'static str),

    #[error("Response parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// True unless the store answered with an explicit rejection
    pub fn is_transport(&self) -> bool {
        !matches!(self, ClientError::Api(_))
    }
}
