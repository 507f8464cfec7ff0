//! Timetable HTTP client.
//!
//! Same host as the trip planner: the route index, the passages at a stop
//! for a service day, and the per-line timetable sheet listing directions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, ORIGIN};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::domain::service_date_param;
use crate::planner::{DEFAULT_BASE_URL, DEFAULT_ORIGIN};

use super::error::ScheduleError;
use super::routes::Direction;
use super::types::{PatternStopTimes, RouteDto, TimetableSheet};

/// Trips per direction requested from the timetable sheet.
const SHEET_TRIPS: u8 = 5;

/// Configuration for the timetable client.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Base URL for the API (defaults to the Grenoble network)
    pub base_url: String,
    /// Value sent in the `Origin` header
    pub origin: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ScheduleConfig {
    /// Create a new config against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            origin: DEFAULT_ORIGIN.to_string(),
            max_concurrent: 5,
            timeout_secs: 30,
        }
    }

    /// Set the `Origin` header value.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Anything that can answer timetable questions.
#[async_trait]
pub trait Timetable: Send + Sync {
    /// Every route the network runs.
    async fn routes(&self) -> Result<Vec<RouteDto>, ScheduleError>;

    /// Passages at a stop on a service day, grouped by pattern.
    async fn stop_times(
        &self,
        stop_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<PatternStopTimes>, ScheduleError>;

    /// Directions of a line with their stops.
    async fn directions(
        &self,
        route_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<Direction>, ScheduleError>;
}

/// Network timetable API client.
#[derive(Debug, Clone)]
pub struct ScheduleClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl ScheduleClient {
    /// Create a new timetable client with the given configuration.
    pub fn new(config: ScheduleConfig) -> Result<Self, ScheduleError> {
        let mut headers = HeaderMap::new();

        let origin = HeaderValue::from_str(&config.origin).map_err(|_| ScheduleError::Api {
            status: 0,
            message: "Invalid origin header".to_string(),
        })?;
        headers.insert(ORIGIN, origin);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// API URL for the given path segments, each percent-encoded.
    ///
    /// A segment can never add path levels: `/`, `?` and `#` inside it are
    /// escaped rather than interpreted.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ScheduleError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ScheduleError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ScheduleError::InvalidUrl(format!("{}: cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        not_found: &str,
    ) -> Result<T, ScheduleError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ScheduleError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScheduleError::NotFound(not_found.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScheduleError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| ScheduleError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

#[async_trait]
impl Timetable for ScheduleClient {
    #[instrument(skip(self))]
    async fn routes(&self) -> Result<Vec<RouteDto>, ScheduleError> {
        let url = self.endpoint(&["routers", "default", "index", "routes"])?;
        let routes: Vec<RouteDto> = self.get_json(url, &[], "route index").await?;
        debug!(count = routes.len(), "fetched route index");
        Ok(routes)
    }

    #[instrument(skip(self))]
    async fn stop_times(
        &self,
        stop_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<PatternStopTimes>, ScheduleError> {
        if matches!(stop_id, "" | "." | "..") {
            return Err(ScheduleError::NotFound(stop_id.to_string()));
        }
        let date = service_date_param(date);
        let url = self.endpoint(&[
            "routers", "default", "index", "stops", stop_id, "stoptimes", &date,
        ])?;
        self.get_json(url, &[], stop_id).await
    }

    #[instrument(skip(self))]
    async fn directions(
        &self,
        route_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<Direction>, ScheduleError> {
        let url = self.endpoint(&["ficheHoraires", "json"])?;
        let sheet: TimetableSheet = self
            .get_json(
                url,
                &[
                    ("route", route_id.to_string()),
                    ("time", at.timestamp_millis().to_string()),
                    ("nbTrips", SHEET_TRIPS.to_string()),
                ],
                route_id,
            )
            .await?;

        let directions: Vec<Direction> = sheet.directions().iter().map(Direction::from).collect();
        if directions.is_empty() {
            return Err(ScheduleError::NotFound(route_id.to_string()));
        }
        Ok(directions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = ScheduleConfig::new("http://localhost:8080")
            .with_origin("test")
            .with_max_concurrent(2)
            .with_timeout(5);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.origin, "test");
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = ScheduleConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.origin, DEFAULT_ORIGIN);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = ScheduleClient::new(ScheduleConfig::new("http://localhost:8080/api/")).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/api");

        let url = client.endpoint(&["routers", "default", "index", "routes"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/routers/default/index/routes");
    }

    #[test]
    fn endpoint_escapes_segments() {
        let client = ScheduleClient::new(ScheduleConfig::new("http://localhost:8080/api")).unwrap();
        let url = client
            .endpoint(&["stops", "../../ficheHoraires/json?route=X#", "stoptimes"])
            .unwrap();

        assert_eq!(
            url.path(),
            "/api/stops/..%2F..%2FficheHoraires%2Fjson%3Froute=X%23/stoptimes"
        );
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());

        let url = client.endpoint(&["stops", "SEM:GENGARES"]).unwrap();
        assert_eq!(url.path(), "/api/stops/SEM:GENGARES");
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let client = ScheduleClient::new(ScheduleConfig::new("not a url")).unwrap();
        assert!(matches!(
            client.endpoint(&["routers"]),
            Err(ScheduleError::InvalidUrl(_))
        ));
    }
}
