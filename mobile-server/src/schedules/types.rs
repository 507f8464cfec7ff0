//! Timetable API DTOs.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Entry of `/routers/default/index/routes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
    /// e.g. "SEM:A"
    pub id: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub long_name: String,
    /// "TRAM", "BUS"...
    pub mode: Option<String>,
    /// Hex colour without '#', when the network publishes one.
    pub color: Option<String>,
}

/// One pattern's passages, as returned by `/stops/{id}/stoptimes/{date}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternStopTimes {
    pub pattern: PatternDto,
    #[serde(default)]
    pub times: Vec<StopTimeDto>,
}

/// A trip pattern (route + direction + stop sequence).
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDto {
    /// e.g. "SEM:A:0:01"; contains the route id
    pub id: String,
    /// Destination shown to riders.
    pub desc: Option<String>,
}

/// One passage at the stop.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTimeDto {
    /// Midnight of the service day, epoch seconds.
    pub service_day: i64,
    /// Seconds after `service_day`.
    pub scheduled_arrival: i64,
    /// Seconds after `service_day`, including live delay.
    pub realtime_arrival: Option<i64>,
    pub trip_id: Option<String>,
}

/// Response of `/ficheHoraires/json`: directions keyed "0", "1"...
///
/// Non-numeric keys carry metadata and are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct TimetableSheet(pub BTreeMap<String, Value>);

/// One direction of a line.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionDto {
    #[serde(default)]
    pub arrets: Vec<SheetStopDto>,
}

/// One stop of a direction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetStopDto {
    pub stop_id: String,
    #[serde(default)]
    pub stop_name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl TimetableSheet {
    /// Directions in key order; entries that are not directions are skipped.
    pub fn directions(&self) -> Vec<DirectionDto> {
        let mut keyed: Vec<(u32, &Value)> = self
            .0
            .iter()
            .filter_map(|(k, v)| Some((k.parse().ok()?, v)))
            .collect();
        keyed.sort_by_key(|(k, _)| *k);

        keyed
            .into_iter()
            .filter_map(|(_, v)| serde_json::from_value(v.clone()).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stoptimes() {
        let json = r#"[{
            "pattern": {"id": "SEM:A:0:01", "desc": "Échirolles Denis Papin", "shortDesc": "A"},
            "times": [
                {"stopId": "SEM:3207", "serviceDay": 1741906800, "scheduledArrival": 30000,
                 "realtimeArrival": 30060, "tripId": "SEM:123", "realtime": true}
            ]
        }]"#;
        let patterns: Vec<PatternStopTimes> = serde_json::from_str(json).unwrap();
        assert_eq!(patterns[0].pattern.id, "SEM:A:0:01");
        assert_eq!(patterns[0].times[0].realtime_arrival, Some(30060));
    }

    #[test]
    fn sheet_directions_skip_metadata() {
        let json = r#"{
            "10": {"arrets": [{"stopId": "SEM:X", "stopName": "Late"}]},
            "0": {"arrets": [{"stopId": "SEM:1", "stopName": "Fontaine La Poya"},
                             {"stopId": "SEM:2", "stopName": "Échirolles Denis Papin"}]},
            "1": {"arrets": []},
            "route": "SEM:A"
        }"#;
        let sheet: TimetableSheet = serde_json::from_str(json).unwrap();
        let directions = sheet.directions();

        assert_eq!(directions.len(), 3);
        assert_eq!(directions[0].arrets[0].stop_name, "Fontaine La Poya");
        assert!(directions[1].arrets.is_empty());
        assert_eq!(directions[2].arrets[0].stop_id, "SEM:X");
    }
}
