//! Geocoding error types.

use thiserror::Error;

/// Errors that can occur during geocoding.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("geocoding API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API
    #[error("geocoding rate limit exceeded")]
    RateLimited,

    /// Failed to parse the response
    #[error("geocoding parse error: {0}")]
    Parse(String),

    /// No access token configured
    #[error("geocoding is not configured (missing access token)")]
    MissingToken,

    /// Nothing matched the query
    #[error("place not found: {0}")]
    PlaceNotFound(String),
}

impl GeocodeError {
    /// Whether the error is about the query rather than the upstream service.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GeocodeError::PlaceNotFound(_))
    }
}
