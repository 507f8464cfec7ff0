//! Server configuration.
//!
//! Every setting has a default suitable for the Grenoble network and can be
//! overridden with a `MOBILE_*` environment variable.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

use crate::cache::CacheConfig;
use crate::domain::Coordinate;
use crate::geocode::{GRENOBLE_CENTER, MapboxConfig};
use crate::planner::{DEFAULT_BASE_URL, DEFAULT_ORIGIN, PlannerConfig};
use crate::schedules::ScheduleConfig;

/// A setting that could not be understood.
#[derive(Debug, Error)]
#[error("invalid value for {var}: {value:?} ({reason})")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `MOBILE_BIND`
    pub bind_addr: SocketAddr,
    /// `MOBILE_API_BASE_URL`: planner and timetable host
    pub api_base_url: String,
    /// `MOBILE_ORIGIN`
    pub origin: String,
    /// `MOBILE_MAPBOX_TOKEN`; empty disables place search
    pub mapbox_token: String,
    /// `MOBILE_CITY`
    pub city: String,
    /// `MOBILE_CITY_CENTER`, as `lat,lon`
    pub city_center: Coordinate,
    /// `MOBILE_ROUTES_TXT`
    pub routes_path: PathBuf,
    /// `MOBILE_CACHE_TTL_SECS`
    pub cache_ttl: Duration,
    /// `MOBILE_CACHE_CAPACITY`
    pub cache_capacity: u64,
    /// `MOBILE_TIMEOUT_SECS`
    pub timeout_secs: u64,
    /// `MOBILE_MAX_CONCURRENT`
    pub max_concurrent: usize,
    /// `MOBILE_TIMEZONE`: the network's clock, as an IANA name
    pub timezone: Tz,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            mapbox_token: String::new(),
            city: "Grenoble".to_string(),
            city_center: GRENOBLE_CENTER,
            routes_path: PathBuf::from("data/routes.txt"),
            cache_ttl: Duration::from_secs(60),
            cache_capacity: 1000,
            timeout_secs: 30,
            max_concurrent: 5,
            timezone: chrono_tz::Europe::Paris,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let city_center = match get("MOBILE_CITY_CENTER") {
            Some(value) => Coordinate::parse_lat_lon(&value).map_err(|e| ConfigError {
                var: "MOBILE_CITY_CENTER",
                value,
                reason: e.to_string(),
            })?,
            None => defaults.city_center,
        };

        let max_concurrent = parse(&get, "MOBILE_MAX_CONCURRENT", defaults.max_concurrent)?;
        if max_concurrent == 0 {
            return Err(ConfigError {
                var: "MOBILE_MAX_CONCURRENT",
                value: max_concurrent.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            bind_addr: parse(&get, "MOBILE_BIND", defaults.bind_addr)?,
            api_base_url: get("MOBILE_API_BASE_URL").unwrap_or(defaults.api_base_url),
            origin: get("MOBILE_ORIGIN").unwrap_or(defaults.origin),
            mapbox_token: get("MOBILE_MAPBOX_TOKEN").unwrap_or(defaults.mapbox_token),
            city: lookup("MOBILE_CITY").unwrap_or(defaults.city),
            city_center,
            routes_path: get("MOBILE_ROUTES_TXT")
                .map(PathBuf::from)
                .unwrap_or(defaults.routes_path),
            cache_ttl: Duration::from_secs(parse(
                &get,
                "MOBILE_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )?),
            cache_capacity: parse(&get, "MOBILE_CACHE_CAPACITY", defaults.cache_capacity)?,
            timeout_secs: parse(&get, "MOBILE_TIMEOUT_SECS", defaults.timeout_secs)?,
            max_concurrent,
            timezone: parse(&get, "MOBILE_TIMEZONE", defaults.timezone)?,
        })
    }

    pub fn planner(&self) -> PlannerConfig {
        PlannerConfig::new(&self.api_base_url)
            .with_origin(&self.origin)
            .with_max_concurrent(self.max_concurrent)
            .with_timeout(self.timeout_secs)
    }

    pub fn schedules(&self) -> ScheduleConfig {
        ScheduleConfig::new(&self.api_base_url)
            .with_origin(&self.origin)
            .with_max_concurrent(self.max_concurrent)
            .with_timeout(self.timeout_secs)
    }

    pub fn mapbox(&self) -> MapboxConfig {
        MapboxConfig::new(&self.mapbox_token)
            .with_city(&self.city)
            .with_proximity(self.city_center)
            .with_timeout(self.timeout_secs)
    }

    pub fn cache(&self) -> CacheConfig {
        CacheConfig {
            ttl: self.cache_ttl,
            max_capacity: self.cache_capacity,
            ..CacheConfig::default()
        }
    }
}

fn parse<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(var) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError {
            var,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.city, "Grenoble");
        assert_eq!(config.city_center, GRENOBLE_CENTER);
        assert!(config.mapbox_token.is_empty());
        assert_eq!(config.timezone, chrono_tz::Europe::Paris);
    }

    #[test]
    fn overrides_from_environment() {
        let config = AppConfig::from_lookup(lookup(&[
            ("MOBILE_BIND", "0.0.0.0:8080"),
            ("MOBILE_API_BASE_URL", "http://localhost:9000/api"),
            ("MOBILE_MAPBOX_TOKEN", "pk.test"),
            ("MOBILE_CITY_CENTER", "45.19,5.72"),
            ("MOBILE_CACHE_TTL_SECS", "300"),
            ("MOBILE_MAX_CONCURRENT", " 8 "),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.planner().base_url, "http://localhost:9000/api");
        assert_eq!(config.schedules().max_concurrent, 8);
        assert_eq!(config.mapbox().access_token, "pk.test");
        assert_eq!(config.city_center, Coordinate::new(5.72, 45.19));
        assert_eq!(config.cache().ttl, Duration::from_secs(300));
    }

    #[test]
    fn empty_city_disables_suffix() {
        let config = AppConfig::from_lookup(lookup(&[("MOBILE_CITY", "")])).unwrap();
        assert_eq!(config.mapbox().city, "");
    }

    #[test]
    fn invalid_number_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("MOBILE_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err.var, "MOBILE_TIMEOUT_SECS");
        assert_eq!(err.value, "soon");
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("MOBILE_MAX_CONCURRENT", "0")])).unwrap_err();
        assert_eq!(err.var, "MOBILE_MAX_CONCURRENT");
        assert_eq!(err.value, "0");
        assert!(err.to_string().contains("at least 1"));

        let config = AppConfig::from_lookup(lookup(&[("MOBILE_MAX_CONCURRENT", "1")])).unwrap();
        assert_eq!(config.max_concurrent, 1);
    }

    #[test]
    fn timezone_by_name() {
        let config =
            AppConfig::from_lookup(lookup(&[("MOBILE_TIMEZONE", "America/Montreal")])).unwrap();
        assert_eq!(config.timezone, chrono_tz::America::Montreal);

        let err = AppConfig::from_lookup(lookup(&[("MOBILE_TIMEZONE", "Grenoble")])).unwrap_err();
        assert_eq!(err.var, "MOBILE_TIMEZONE");
    }

    #[test]
    fn invalid_center_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("MOBILE_CITY_CENTER", "grenoble")])).unwrap_err();
        assert_eq!(err.var, "MOBILE_CITY_CENTER");
    }
}
