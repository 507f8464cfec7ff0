//! Mapbox geocoding client.
//!
//! Turns place names typed by users into coordinates, biased towards the
//! Grenoble area, and coordinates back into addresses. Results are cached on
//! the lower-cased query.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Url;
use tracing::{debug, instrument};

use crate::domain::{BoundingBox, Coordinate};

use super::error::GeocodeError;
use super::types::{PlaceCandidate, PlacesResponse};

/// Default Mapbox API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Queries shorter than this never reach the API.
pub const MIN_QUERY_CHARS: usize = 3;

/// Grenoble city centre.
pub const GRENOBLE_CENTER: Coordinate = Coordinate {
    lon: 5.724524,
    lat: 45.188529,
};

/// Configuration for the Mapbox geocoder.
#[derive(Debug, Clone)]
pub struct MapboxConfig {
    /// Mapbox access token; empty disables geocoding
    pub access_token: String,
    /// Base URL for the API (defaults to production Mapbox)
    pub base_url: String,
    /// Appended to free-text queries, e.g. "Grenoble"
    pub city: String,
    /// Results are ranked by distance to this point
    pub proximity: Coordinate,
    /// Results outside this box are dropped by the API
    pub bbox: Option<BoundingBox>,
    /// Maximum number of candidates
    pub limit: u8,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// How long results are cached
    pub cache_ttl: Duration,
}

impl MapboxConfig {
    /// Create a new config with the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            city: "Grenoble".to_string(),
            proximity: GRENOBLE_CENTER,
            bbox: Some(BoundingBox {
                min: Coordinate::new(5.6, 45.1),
                max: Coordinate::new(5.9, 45.3),
            }),
            limit: 5,
            timeout_secs: 10,
            cache_ttl: Duration::from_secs(24 * 3600),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the city appended to queries; empty disables the suffix.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    /// Set the proximity bias point.
    pub fn with_proximity(mut self, proximity: Coordinate) -> Self {
        self.proximity = proximity;
        self
    }

    /// Set or clear the search box.
    pub fn with_bbox(mut self, bbox: Option<BoundingBox>) -> Self {
        self.bbox = bbox;
        self
    }

    /// Set the maximum number of candidates.
    pub fn with_limit(mut self, limit: u8) -> Self {
        self.limit = limit;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// The text actually sent for a user query.
    ///
    /// The city is appended unless the query already names it.
    pub fn localized_query(&self, query: &str) -> String {
        let query = query.trim();
        if self.city.is_empty() || query.to_lowercase().contains(&self.city.to_lowercase()) {
            query.to_string()
        } else {
            format!("{query}, {}", self.city)
        }
    }
}

/// Anything that can turn text into places.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Ranked candidates for a free-text query, best first.
    ///
    /// Queries shorter than three characters yield no candidates.
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>, GeocodeError>;

    /// Address of a position, if one is known.
    async fn reverse(&self, at: Coordinate) -> Result<Option<String>, GeocodeError>;
}

/// Resolve user input to a single place.
///
/// Accepts a `lat,lon` literal as-is; anything else goes through the
/// geocoder and the best candidate wins.
pub async fn resolve_place(
    geocoder: &dyn Geocoder,
    text: &str,
) -> Result<PlaceCandidate, GeocodeError> {
    let text = text.trim();
    if let Ok(center) = Coordinate::parse_lat_lon(text) {
        return Ok(PlaceCandidate {
            name: text.to_string(),
            center,
        });
    }

    geocoder
        .search(text)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::PlaceNotFound(text.to_string()))
}

/// Mapbox places API client with caching.
#[derive(Debug)]
pub struct MapboxGeocoder {
    http: reqwest::Client,
    config: MapboxConfig,
    cache: Cache<String, Arc<Vec<PlaceCandidate>>>,
}

impl MapboxGeocoder {
    /// Create a new geocoder.
    pub fn new(config: MapboxConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            http,
            config,
            cache,
        })
    }

    /// Whether an access token is configured.
    pub fn is_configured(&self) -> bool {
        !self.config.access_token.is_empty()
    }

    fn places_url(&self, text: &str) -> Result<Url, GeocodeError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| GeocodeError::Parse(format!("invalid base URL: {e}")))?;
        let file = format!("{text}.json");
        url.path_segments_mut()
            .map_err(|()| GeocodeError::Parse("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places", file.as_str()]);
        Ok(url)
    }

    async fn fetch(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<PlacesResponse, GeocodeError> {
        if !self.is_configured() {
            return Err(GeocodeError::MissingToken);
        }

        let response = self
            .http
            .get(url)
            .query(&[("access_token", self.config.access_token.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GeocodeError::Parse(e.to_string()))
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>, GeocodeError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let cache_key = query.to_lowercase();
        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!(%query, "geocoding cache hit");
            return Ok(cached.as_ref().clone());
        }

        let url = self.places_url(&self.config.localized_query(query))?;
        let proximity = self.config.proximity;
        let mut params = vec![
            ("proximity", format!("{},{}", proximity.lon, proximity.lat)),
            ("limit", self.config.limit.to_string()),
            ("country", "fr".to_string()),
            ("types", "address,place,poi".to_string()),
            ("language", "fr".to_string()),
        ];
        if let Some(bbox) = self.config.bbox {
            params.push((
                "bbox",
                format!("{},{},{},{}", bbox.min.lon, bbox.min.lat, bbox.max.lon, bbox.max.lat),
            ));
        }

        debug!(%query, "geocoding query");
        let response = self.fetch(url, &params).await?;

        let candidates: Vec<PlaceCandidate> = response
            .features
            .iter()
            .filter_map(|f| f.to_candidate())
            .collect();

        self.cache
            .insert(cache_key, Arc::new(candidates.clone()))
            .await;

        Ok(candidates)
    }

    #[instrument(skip(self))]
    async fn reverse(&self, at: Coordinate) -> Result<Option<String>, GeocodeError> {
        let url = self.places_url(&format!("{},{}", at.lon, at.lat))?;
        let response = self
            .fetch(url, &[("language", "fr".to_string())])
            .await?;

        Ok(response
            .features
            .into_iter()
            .find_map(|f| f.place_name))
    }
}
