//! Timetable error types.

use thiserror::Error;

/// Errors from the timetable API and the line catalogue.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// HTTP request failed
    #[error("timetable request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("timetable API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response
    #[error("timetable parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// The configured base URL cannot take API paths
    #[error("invalid timetable URL {0}")]
    InvalidUrl(String),

    /// The stop or line is unknown to the API
    #[error("not found: {0}")]
    NotFound(String),

    /// `routes.txt` could not be opened
    #[error("cannot read {path}: {source}")]
    RoutesFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ScheduleError::NotFound("SEM:0000".into());
        assert_eq!(err.to_string(), "not found: SEM:0000");

        let err = ScheduleError::RoutesFile {
            path: "data/routes.txt".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "cannot read data/routes.txt: missing");
    }
}
