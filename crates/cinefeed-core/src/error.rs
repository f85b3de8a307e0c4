use cinefeed_client::ApiError;
use thiserror::Error;

/// Errors as they are shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Network Error: {0}")]
    NetworkError(String),
    #[error("Invalid data received from server")]
    InvalidData,
    #[error("No internet connection available")]
    NoInternetConnection,
    #[error("API key is missing or invalid")]
    ApiKeyMissing,
    #[error("Too many requests. Please try again later")]
    RateLimitExceeded,
    #[error("Movie not found")]
    MovieNotFound,
    #[error("An unexpected error occurred")]
    Unknown,
}

impl AppError {
    /// Whether offering the user a retry makes sense
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_)
            | AppError::NoInternetConnection
            | AppError::RateLimitExceeded
            | AppError::Unknown => true,
            AppError::InvalidData | AppError::ApiKeyMissing | AppError::MovieNotFound => false,
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::ServerError(401) => AppError::ApiKeyMissing,
            ApiError::ServerError(404) => AppError::MovieNotFound,
            ApiError::ServerError(429) => AppError::RateLimitExceeded,
            ApiError::ServerError(code) => {
                AppError::NetworkError(format!("Server error with code: {}", code))
            }
            ApiError::DecodingError(_) => AppError::InvalidData,
            ApiError::NetworkUnavailable(_) => AppError::NoInternetConnection,
            ApiError::InvalidUrl(_) => AppError::NetworkError("Invalid URL".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_mapping() {
        assert_eq!(AppError::from(ApiError::ServerError(401)), AppError::ApiKeyMissing);
        assert_eq!(AppError::from(ApiError::ServerError(404)), AppError::MovieNotFound);
        assert_eq!(AppError::from(ApiError::ServerError(429)), AppError::RateLimitExceeded);
        assert_eq!(
            AppError::from(ApiError::ServerError(503)),
            AppError::NetworkError("Server error with code: 503".to_string())
        );
        assert_eq!(
            AppError::from(ApiError::DecodingError("missing field `title`".to_string())),
            AppError::InvalidData
        );
        assert_eq!(
            AppError::from(ApiError::NetworkUnavailable("dns".to_string())),
            AppError::NoInternetConnection
        );
        assert_eq!(
            AppError::from(ApiError::InvalidUrl("x".to_string())),
            AppError::NetworkError("Invalid URL".to_string())
        );
    }

    #[test]
    fn test_retryable() {
        assert!(AppError::NetworkError("x".to_string()).is_retryable());
        assert!(AppError::NoInternetConnection.is_retryable());
        assert!(AppError::RateLimitExceeded.is_retryable());
        assert!(AppError::Unknown.is_retryable());
        assert!(!AppError::InvalidData.is_retryable());
        assert!(!AppError::ApiKeyMissing.is_retryable());
        assert!(!AppError::MovieNotFound.is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            AppError::NetworkError("Invalid URL".to_string()).to_string(),
            "Network Error: Invalid URL"
        );
        assert_eq!(AppError::MovieNotFound.to_string(), "Movie not found");
    }
}
