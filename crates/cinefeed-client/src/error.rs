use thiserror::Error;

/// Failures of a single API call. Every endpoint reports exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Base URL, endpoint or query could not form a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A response arrived with a status outside 200-299
    #[error("Server error with code: {0}")]
    ServerError(u16),

    /// The body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    DecodingError(String),

    /// DNS, connection, timeout or body-read failure
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ServerError(status) => Some(*status),
            _ => None,
        }
    }
}
