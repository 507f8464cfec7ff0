//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::domain::{Coordinate, ModeSet, whole_minutes};
use crate::geocode::{GeocodeError, resolve_place};
use crate::planner::{PlanRequest, PlannerError};
use crate::render::{ItinerarySummary, render_itinerary};
use crate::schedules::{PassageView, ROUTE_TYPE_BUS, ROUTE_TYPE_TRAM, ScheduleError, select_passages};

use super::dto::*;
use super::state::AppState;

/// Shown when a position has no known address.
const UNKNOWN_ADDRESS: &str = "Adresse inconnue";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/places", get(search_places))
        .route("/api/places/reverse", get(reverse_place))
        .route("/api/itinerary", get(plan_itinerary))
        .route("/api/travel-time", get(travel_time))
        .route("/api/lines", get(list_lines))
        .route("/api/lines/:route_id/directions", get(line_directions))
        .route("/api/stops/:stop_id/passages", get(stop_passages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Autocomplete place names.
async fn search_places(
    State(state): State<AppState>,
    Query(req): Query<PlacesQuery>,
) -> Result<Json<PlacesResponse>, AppError> {
    let places = state.geocoder.search(&req.q).await?;
    Ok(Json(PlacesResponse { places }))
}

/// Address of a map position.
async fn reverse_place(
    State(state): State<AppState>,
    Query(req): Query<ReverseQuery>,
) -> Result<Json<ReverseResponse>, AppError> {
    let address = state
        .geocoder
        .reverse(Coordinate::new(req.lon, req.lat))
        .await?;
    let label = address.clone().unwrap_or_else(|| UNKNOWN_ADDRESS.to_string());
    Ok(Json(ReverseResponse { address, label }))
}

/// Plan a trip and render its best itinerary for the map.
async fn plan_itinerary(
    State(state): State<AppState>,
    Query(req): Query<ItineraryQuery>,
) -> Result<Json<ItineraryResponse>, AppError> {
    let modes = parse_mode(req.mode.as_deref())?;
    let when = parse_when(
        req.date.as_deref(),
        req.time.as_deref(),
        Utc::now().with_timezone(&state.timezone).naive_local(),
    )?;

    let geocoder = state.geocoder.as_ref();
    let (from, to) = futures::try_join!(
        resolve_place(geocoder, &req.from),
        resolve_place(geocoder, &req.to)
    )?;

    let request = PlanRequest::new(from.center, to.center, when)
        .with_modes(modes)
        .arriving_by(req.arrive_by);
    let itineraries = state.planner.plan(&request).await?;

    let (best, others) = itineraries.split_first().ok_or(PlannerError::NoItinerary)?;
    let rendered = render_itinerary(best, from.center, to.center, &state.timezone);
    let alternatives = others
        .iter()
        .map(|it| ItinerarySummary::new(it, &state.timezone))
        .collect();

    info!(
        from = %from.name,
        to = %to.name,
        modes = modes.as_param(),
        minutes = rendered.summary.duration_minutes,
        "planned itinerary"
    );

    Ok(Json(ItineraryResponse::new(from, to, modes, rendered, alternatives)))
}

/// Estimated door-to-door travel time.
async fn travel_time(
    State(state): State<AppState>,
    Query(req): Query<ItineraryQuery>,
) -> Result<Json<TravelTimeResponse>, AppError> {
    let modes = parse_mode(req.mode.as_deref())?;
    let when = parse_when(
        req.date.as_deref(),
        req.time.as_deref(),
        Utc::now().with_timezone(&state.timezone).naive_local(),
    )?;

    let geocoder = state.geocoder.as_ref();
    let (from, to) = futures::try_join!(
        resolve_place(geocoder, &req.from),
        resolve_place(geocoder, &req.to)
    )?;

    let duration_secs = state
        .planner
        .travel_time(from.center, to.center, modes, when)
        .await?;

    Ok(Json(TravelTimeResponse {
        mode: modes,
        mode_label: modes.label(),
        duration_secs,
        minutes: whole_minutes(duration_secs),
    }))
}

/// Tram and bus lines, optionally filtered by name.
async fn list_lines(
    State(state): State<AppState>,
    Query(req): Query<LinesQuery>,
) -> Result<Json<LinesResponse>, AppError> {
    let catalog = state.line_catalog().await?;

    let (trams, buses) = match req.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => (
            catalog.search(ROUTE_TYPE_TRAM, q),
            catalog.search(ROUTE_TYPE_BUS, q),
        ),
        None => (catalog.trams(), catalog.buses()),
    };

    Ok(Json(LinesResponse {
        trams: trams.into_iter().cloned().collect(),
        buses: buses.into_iter().cloned().collect(),
    }))
}

/// Directions and stops of a line.
async fn line_directions(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> Result<Json<DirectionsResponse>, AppError> {
    let directions = state.timetable.directions(&route_id, Utc::now()).await?;
    Ok(Json(DirectionsResponse {
        route_id,
        directions,
    }))
}

/// Next passages at a stop.
async fn stop_passages(
    State(state): State<AppState>,
    Path(stop_id): Path<String>,
    Query(req): Query<PassagesQuery>,
) -> Result<Json<PassagesResponse>, AppError> {
    let now = Utc::now();
    let service_day = now.with_timezone(&state.timezone).date_naive();

    let patterns = state.timetable.stop_times(&stop_id, service_day).await?;
    let passages = select_passages(&patterns, req.route.as_deref(), now)
        .iter()
        .map(|p| PassageView::new(p, now, &state.timezone))
        .collect();

    Ok(Json(PassagesResponse { stop_id, passages }))
}

/// Parse the requested mode set; absent means public transport.
fn parse_mode(mode: Option<&str>) -> Result<ModeSet, AppError> {
    match mode.map(str::trim).filter(|m| !m.is_empty()) {
        Some(m) => m.parse().map_err(|e: crate::domain::UnknownModeSet| AppError::BadRequest {
            message: e.to_string(),
        }),
        None => Ok(ModeSet::default()),
    }
}

/// Combine optional date and time with `now` for the missing parts.
fn parse_when(
    date: Option<&str>,
    time: Option<&str>,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, AppError> {
    let date = match date.filter(|d| !d.is_empty()) {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| AppError::BadRequest {
            message: format!("Invalid date (expected YYYY-MM-DD): {d}"),
        })?,
        None => now.date(),
    };
    let time = match time.filter(|t| !t.is_empty()) {
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M").map_err(|_| AppError::BadRequest {
            message: format!("Invalid time (expected HH:MM): {t}"),
        })?,
        None => now.time(),
    };
    Ok(date.and_time(time))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    /// An upstream service failed
    Upstream { message: String },
    Internal { message: String },
}

impl From<PlannerError> for AppError {
    fn from(e: PlannerError) -> Self {
        if e.is_not_found() {
            AppError::NotFound {
                message: e.to_string(),
            }
        } else {
            AppError::Upstream {
                message: e.to_string(),
            }
        }
    }
}

impl From<GeocodeError> for AppError {
    fn from(e: GeocodeError) -> Self {
        match e {
            GeocodeError::PlaceNotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            GeocodeError::MissingToken => AppError::Internal {
                message: e.to_string(),
            },
            _ => AppError::Upstream {
                message: e.to_string(),
            },
        }
    }
}

impl From<ScheduleError> for AppError {
    fn from(e: ScheduleError) -> Self {
        match e {
            ScheduleError::NotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            ScheduleError::RoutesFile { .. } | ScheduleError::InvalidUrl(_) => AppError::Internal {
                message: e.to_string(),
            },
            _ => AppError::Upstream {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
