use std::error::Error;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mobile_server::cache::CachedPlanner;
use mobile_server::config::AppConfig;
use mobile_server::geocode::MapboxGeocoder;
use mobile_server::planner::PlannerClient;
use mobile_server::schedules::{ScheduleClient, load_route_styles};
use mobile_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mobile_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().inspect_err(|e| error!(error = %e, "bad configuration"))?;

    let planner = CachedPlanner::new(PlannerClient::new(config.planner())?, &config.cache());

    let geocoder = MapboxGeocoder::new(config.mapbox())?;
    if !geocoder.is_configured() {
        warn!("MOBILE_MAPBOX_TOKEN not set; place search will fail");
    }

    let timetable = ScheduleClient::new(config.schedules())?;

    // Lines still list without colours when routes.txt is missing
    let route_styles = load_route_styles(&config.routes_path).unwrap_or_else(|e| {
        warn!(error = %e, "no line colours available");
        Vec::new()
    });
    info!(styles = route_styles.len(), "loaded route styles");

    let state = AppState::new(planner, geocoder, timetable, route_styles, config.timezone);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        planner = %config.api_base_url,
        timezone = %config.timezone,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
