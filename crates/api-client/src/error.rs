use analytics::MetricsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to send the HTTP request: {0}")]
    RequestBuild(#[from] reqwest::Error),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Symbol not found: {0}")]
    NotFound(String),

    #[error("The API request returned an error: {0}")]
    ApiError(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),
}

/// The engine only distinguishes "nothing to compute on" from everything else
/// that went wrong at the provider boundary.
impl From<ApiError> for MetricsError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(_) => MetricsError::NoData,
            other => MetricsError::provider(other.to_string()),
        }
    }
}
