use serde::de::DeserializeOwned;
use crate::error::ApiError;

/// Parse a JSON body into `T`. Unknown fields are ignored; a missing required
/// field or a type mismatch fails the whole value.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| ApiError::DecodingError(e.to_string()))
}
