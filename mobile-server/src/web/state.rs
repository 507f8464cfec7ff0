//! Application state for the web layer.

use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::geocode::Geocoder;
use crate::planner::TripPlanner;
use crate::schedules::{LineCatalog, RouteStyle, ScheduleError, Timetable};

/// How long the merged line catalogue is kept.
const CATALOG_TTL: Duration = Duration::from_secs(60 * 60);

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Trip planner, usually cached
    pub planner: Arc<dyn TripPlanner>,

    /// Place search
    pub geocoder: Arc<dyn Geocoder>,

    /// Line and stop timetables
    pub timetable: Arc<dyn Timetable>,

    /// Colours and types from `routes.txt`
    pub route_styles: Arc<Vec<RouteStyle>>,

    /// Zone of the network's timetables and of every time shown
    pub timezone: Tz,

    catalog: MokaCache<(), Arc<LineCatalog>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        planner: impl TripPlanner + 'static,
        geocoder: impl Geocoder + 'static,
        timetable: impl Timetable + 'static,
        route_styles: Vec<RouteStyle>,
        timezone: Tz,
    ) -> Self {
        Self {
            planner: Arc::new(planner),
            geocoder: Arc::new(geocoder),
            timetable: Arc::new(timetable),
            route_styles: Arc::new(route_styles),
            timezone,
            catalog: MokaCache::builder()
                .max_capacity(1)
                .time_to_live(CATALOG_TTL)
                .build(),
        }
    }

    /// The merged line catalogue, fetched at most once per TTL.
    pub async fn line_catalog(&self) -> Result<Arc<LineCatalog>, ScheduleError> {
        if let Some(catalog) = self.catalog.get(&()).await {
            return Ok(catalog);
        }

        let routes = self.timetable.routes().await?;
        let catalog = Arc::new(LineCatalog::merge(&routes, &self.route_styles));
        debug!(lines = catalog.len(), "built line catalogue");

        self.catalog.insert((), catalog.clone()).await;
        Ok(catalog)
    }
}
