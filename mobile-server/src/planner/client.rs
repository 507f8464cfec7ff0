//! Trip planner HTTP client.
//!
//! Queries the network's OpenTripPlanner `/plan` endpoint and converts the
//! answer to domain itineraries.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, ORIGIN};
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::domain::{Coordinate, Itinerary, ModeSet};

use super::convert::convert_plan;
use super::error::PlannerError;
use super::types::PlanResponse;

/// Default base URL of the Grenoble network API.
pub const DEFAULT_BASE_URL: &str = "https://data.mobilites-m.fr/api";

/// Default value of the `Origin` header the network API requires.
pub const DEFAULT_ORIGIN: &str = "GreMobile";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default number of itineraries asked for.
const DEFAULT_NUM_ITINERARIES: u8 = 3;

/// Configuration for the planner client.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Base URL for the API (defaults to the Grenoble network)
    pub base_url: String,
    /// Value sent in the `Origin` header
    pub origin: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl PlannerConfig {
    /// Create a new config against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            origin: DEFAULT_ORIGIN.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
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

/// A trip to plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub from: Coordinate,
    pub to: Coordinate,
    /// Local date and time of departure (or arrival, with `arrive_by`)
    pub when: NaiveDateTime,
    pub modes: ModeSet,
    pub arrive_by: bool,
    pub num_itineraries: u8,
    pub show_intermediate_stops: bool,
}

impl PlanRequest {
    /// Depart from `from` at `when` using public transport.
    pub fn new(from: Coordinate, to: Coordinate, when: NaiveDateTime) -> Self {
        Self {
            from,
            to,
            when,
            modes: ModeSet::default(),
            arrive_by: false,
            num_itineraries: DEFAULT_NUM_ITINERARIES,
            show_intermediate_stops: true,
        }
    }

    pub fn with_modes(mut self, modes: ModeSet) -> Self {
        self.modes = modes;
        self
    }

    /// Treat `when` as the latest arrival time.
    pub fn arriving_by(mut self, arrive_by: bool) -> Self {
        self.arrive_by = arrive_by;
        self
    }

    pub fn with_num_itineraries(mut self, n: u8) -> Self {
        self.num_itineraries = n;
        self
    }

    pub fn with_intermediate_stops(mut self, show: bool) -> Self {
        self.show_intermediate_stops = show;
        self
    }

    /// Query string of the `/plan` call.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("fromPlace", self.from.to_place_param()),
            ("toPlace", self.to.to_place_param()),
            ("date", self.when.format("%Y-%m-%d").to_string()),
            ("time", self.when.format("%H:%M").to_string()),
            ("mode", self.modes.as_param().to_string()),
            ("numItineraries", self.num_itineraries.to_string()),
            ("showIntermediateStops", self.show_intermediate_stops.to_string()),
            ("arriveBy", self.arrive_by.to_string()),
            ("maxWalkDistance", self.modes.max_walk_distance_m().to_string()),
            ("walkReluctance", self.modes.walk_reluctance().to_string()),
            ("locale", "fr".to_string()),
        ]
    }
}

/// Anything that can plan trips.
#[async_trait]
pub trait TripPlanner: Send + Sync {
    /// Plan a trip, best itinerary first.
    ///
    /// Never returns an empty list; no itinerary is `PlannerError::NoItinerary`.
    async fn plan(&self, request: &PlanRequest) -> Result<Arc<Vec<Itinerary>>, PlannerError>;

    /// Duration in seconds of the best itinerary.
    async fn travel_time(
        &self,
        from: Coordinate,
        to: Coordinate,
        modes: ModeSet,
        when: NaiveDateTime,
    ) -> Result<f64, PlannerError> {
        let request = PlanRequest::new(from, to, when)
            .with_modes(modes)
            .with_num_itineraries(1)
            .with_intermediate_stops(false);
        let itineraries = self.plan(&request).await?;
        itineraries
            .first()
            .map(|it| it.duration_secs)
            .ok_or(PlannerError::NoItinerary)
    }
}

/// OpenTripPlanner client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct PlannerClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl PlannerClient {
    /// Create a new planner client with the given configuration.
    pub fn new(config: PlannerConfig) -> Result<Self, PlannerError> {
        let mut headers = HeaderMap::new();

        let origin = HeaderValue::from_str(&config.origin).map_err(|_| PlannerError::ApiError {
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

    /// Fetch the raw `/plan` response.
    pub async fn plan_raw(&self, request: &PlanRequest) -> Result<PlanResponse, PlannerError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| PlannerError::ApiError {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/routers/default/plan", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&request.query_params())
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PlannerError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlannerError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| PlannerError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

#[async_trait]
impl TripPlanner for PlannerClient {
    #[instrument(skip(self, request), fields(modes = request.modes.as_param()))]
    async fn plan(&self, request: &PlanRequest) -> Result<Arc<Vec<Itinerary>>, PlannerError> {
        let response = self.plan_raw(request).await?;

        if let Some(error) = response.error {
            return Err(PlannerError::Planner {
                id: error.id,
                message: error
                    .msg
                    .or(error.message)
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let plan = response.plan.ok_or(PlannerError::NoItinerary)?;
        let itineraries = convert_plan(&plan);
        debug!(
            received = plan.itineraries.len(),
            kept = itineraries.len(),
            "planned trip"
        );

        if itineraries.is_empty() {
            return Err(PlannerError::NoItinerary);
        }
        Ok(Arc::new(itineraries))
    }
}
