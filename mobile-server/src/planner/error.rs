//! Trip planner client error types.

use std::fmt;

/// Errors from the trip planner HTTP client.
#[derive(Debug)]
pub enum PlannerError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    ApiError { status: u16, message: String },

    /// Rate limited by the API
    RateLimited,

    /// The planner answered with an error object (bad place, no path...)
    Planner { id: Option<i32>, message: String },

    /// The plan contained no usable itinerary
    NoItinerary,
}

impl PlannerError {
    /// Whether the error means "no route", as opposed to an upstream failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PlannerError::NoItinerary | PlannerError::Planner { id: Some(404), .. }
        )
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::Http(e) => write!(f, "HTTP error: {e}"),
            PlannerError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            PlannerError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            PlannerError::RateLimited => write!(f, "rate limited by trip planner"),
            PlannerError::Planner { id, message } => match id {
                Some(id) => write!(f, "planner error {id}: {message}"),
                None => write!(f, "planner error: {message}"),
            },
            PlannerError::NoItinerary => write!(f, "no itinerary found"),
        }
    }
}

impl std::error::Error for PlannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlannerError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        PlannerError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(PlannerError::NoItinerary.to_string(), "no itinerary found");

        let err = PlannerError::ApiError {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "API error 503: Service Unavailable");

        let err = PlannerError::Planner {
            id: Some(404),
            message: "Trip is not possible.".into(),
        };
        assert_eq!(err.to_string(), "planner error 404: Trip is not possible.");

        let err = PlannerError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("<html>"));
    }

    #[test]
    fn not_found_classification() {
        assert!(PlannerError::NoItinerary.is_not_found());
        assert!(
            PlannerError::Planner {
                id: Some(404),
                message: String::new()
            }
            .is_not_found()
        );
        assert!(
            !PlannerError::Planner {
                id: Some(500),
                message: String::new()
            }
            .is_not_found()
        );
        assert!(!PlannerError::RateLimited.is_not_found());
    }
}
