//! Next passages at a stop.

use std::cmp::Ordering;
use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::domain::{clock_time, wait_label};

use super::types::PatternStopTimes;

/// Passages shown when none is upcoming.
const PAST_FALLBACK_COUNT: usize = 5;

/// Passages shown when no pattern belongs to the requested route.
const UNMATCHED_COUNT: usize = 10;

/// How a passage compares with its timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Punctuality {
    OnTime,
    Late,
    Early,
}

impl Punctuality {
    /// Badge text, if any.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Punctuality::OnTime => None,
            Punctuality::Late => Some("Retard"),
            Punctuality::Early => Some("Avance"),
        }
    }
}

/// One vehicle passing at the stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub scheduled: DateTime<Utc>,
    /// Scheduled time when no live data exists
    pub realtime: DateTime<Utc>,
    pub pattern_id: String,
    /// Destination shown to riders
    pub destination: Option<String>,
    pub trip_id: Option<String>,
}

impl Passage {
    pub fn punctuality(&self) -> Punctuality {
        match self.realtime.cmp(&self.scheduled) {
            Ordering::Equal => Punctuality::OnTime,
            Ordering::Greater => Punctuality::Late,
            Ordering::Less => Punctuality::Early,
        }
    }
}

/// A passage ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassageView {
    /// `HH:MM` of the expected arrival
    pub time: String,
    /// "Passé", "4 min", "1h05"
    pub wait: String,
    pub destination: Option<String>,
    pub trip_id: Option<String>,
    pub punctuality: Punctuality,
    pub badge: Option<&'static str>,
}

impl PassageView {
    pub fn new<Tz: TimeZone>(passage: &Passage, now: DateTime<Utc>, zone: &Tz) -> Self
    where
        Tz::Offset: Display,
    {
        let punctuality = passage.punctuality();
        Self {
            time: clock_time(passage.realtime, zone),
            wait: wait_label(passage.realtime, now),
            destination: passage.destination.clone(),
            trip_id: passage.trip_id.clone(),
            punctuality,
            badge: punctuality.label(),
        }
    }
}

/// Flatten patterns into passages sorted by expected arrival.
pub fn flatten_passages<'a>(patterns: impl IntoIterator<Item = &'a PatternStopTimes>) -> Vec<Passage> {
    let mut passages: Vec<Passage> = patterns
        .into_iter()
        .flat_map(|p| {
            p.times.iter().filter_map(move |t| {
                let scheduled = DateTime::from_timestamp(t.service_day + t.scheduled_arrival, 0)?;
                let realtime = match t.realtime_arrival {
                    Some(secs) => DateTime::from_timestamp(t.service_day + secs, 0)?,
                    None => scheduled,
                };
                Some(Passage {
                    scheduled,
                    realtime,
                    pattern_id: p.pattern.id.clone(),
                    destination: p.pattern.desc.clone(),
                    trip_id: t.trip_id.clone(),
                })
            })
        })
        .collect();
    passages.sort_by_key(|p| p.realtime);
    passages
}

/// Choose the passages to show at a stop.
///
/// The patterns of the route count, or all of them without a route: their
/// upcoming passages, or the first few of the day when all have gone. When
/// no pattern belongs to the route, the first passages across all patterns.
pub fn select_passages(
    patterns: &[PatternStopTimes],
    route_id: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<Passage> {
    let relevant: Vec<&PatternStopTimes> = match route_id {
        Some(route_id) => patterns
            .iter()
            .filter(|p| p.pattern.id.contains(route_id))
            .collect(),
        None => patterns.iter().collect(),
    };

    if relevant.is_empty() {
        return flatten_passages(patterns)
            .into_iter()
            .take(UNMATCHED_COUNT)
            .collect();
    }

    let sorted = flatten_passages(relevant);
    let upcoming: Vec<Passage> = sorted.iter().filter(|p| p.realtime > now).cloned().collect();
    if upcoming.is_empty() {
        sorted.into_iter().take(PAST_FALLBACK_COUNT).collect()
    } else {
        upcoming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedules::types::{PatternDto, StopTimeDto};

    const DAY: i64 = 1_741_906_800;

    fn pattern(id: &str, arrivals: &[(i64, Option<i64>)]) -> PatternStopTimes {
        PatternStopTimes {
            pattern: PatternDto {
                id: id.into(),
                desc: Some(format!("to {id}")),
            },
            times: arrivals
                .iter()
                .enumerate()
                .map(|(i, &(scheduled, realtime))| StopTimeDto {
                    service_day: DAY,
                    scheduled_arrival: scheduled,
                    realtime_arrival: realtime,
                    trip_id: Some(format!("{id}:{i}")),
                })
                .collect(),
        }
    }

    fn at(secs_after_midnight: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(DAY + secs_after_midnight, 0).unwrap()
    }

    #[test]
    fn flatten_sorts_by_realtime() {
        let patterns = [
            pattern("SEM:A:0:01", &[(600, Some(900)), (1200, None)]),
            pattern("SEM:B:0:01", &[(700, Some(700))]),
        ];
        let passages = flatten_passages(&patterns);

        let order: Vec<i64> = passages.iter().map(|p| p.realtime.timestamp() - DAY).collect();
        assert_eq!(order, [700, 900, 1200]);
        assert_eq!(passages[1].punctuality(), Punctuality::Late);
        assert_eq!(passages[2].realtime, passages[2].scheduled);
    }

    #[test]
    fn route_filter_keeps_upcoming() {
        let patterns = [
            pattern("SEM:A:0:01", &[(600, None), (1200, None), (1800, None)]),
            pattern("SEM:B:0:01", &[(1300, None)]),
        ];
        let passages = select_passages(&patterns, Some("SEM:A"), at(1000));

        assert_eq!(passages.len(), 2);
        assert!(passages.iter().all(|p| p.pattern_id.starts_with("SEM:A")));
        assert_eq!(passages[0].realtime, at(1200));
    }

    #[test]
    fn route_filter_without_upcoming_shows_first_five() {
        let times: Vec<(i64, Option<i64>)> = (0..8).map(|i| (i * 60, None)).collect();
        let patterns = [pattern("SEM:A:0:01", &times)];
        let passages = select_passages(&patterns, Some("SEM:A"), at(10_000));

        assert_eq!(passages.len(), 5);
        assert_eq!(passages[0].realtime, at(0));
    }

    #[test]
    fn unmatched_route_shows_first_ten_of_all() {
        let times: Vec<(i64, Option<i64>)> = (0..12).map(|i| (i * 60, None)).collect();
        let patterns = [pattern("SEM:A:0:01", &times[..6]), pattern("SEM:B:0:01", &times[6..])];
        let passages = select_passages(&patterns, Some("SEM:E"), at(0));

        assert_eq!(passages.len(), 10);
        assert_eq!(passages[9].realtime, at(540));
    }

    #[test]
    fn no_route_keeps_upcoming_of_all_patterns() {
        let hourly: Vec<(i64, Option<i64>)> = (0..24).map(|h| (h * 3600, None)).collect();
        let patterns = [pattern("SEM:A:0:01", &hourly[..12]), pattern("SEM:B:0:01", &hourly[12..])];
        let passages = select_passages(&patterns, None, at(18 * 3600 + 1));

        assert_eq!(passages.len(), 5);
        assert!(passages.iter().all(|p| p.realtime > at(18 * 3600)));
        assert_eq!(passages[0].realtime, at(19 * 3600));
        assert!(passages.iter().all(|p| p.pattern_id.starts_with("SEM:B")));
    }

    #[test]
    fn no_route_late_at_night_shows_first_five() {
        let hourly: Vec<(i64, Option<i64>)> = (0..8).map(|h| (h * 3600, None)).collect();
        let patterns = [pattern("SEM:A:0:01", &hourly)];
        let passages = select_passages(&patterns, None, at(23 * 3600));

        assert_eq!(passages.len(), 5);
        assert_eq!(passages[0].realtime, at(0));
        assert!(select_passages(&[], None, at(0)).is_empty());
    }

    #[test]
    fn view_formats_time_and_wait() {
        let passages = flatten_passages(&[pattern("SEM:A:0:01", &[(8 * 3600, Some(8 * 3600 - 60))])]);
        let view = PassageView::new(&passages[0], at(7 * 3600), &Utc);

        assert_eq!(view.wait, "59 min");
        assert_eq!(view.punctuality, Punctuality::Early);
        assert_eq!(view.badge, Some("Avance"));
        assert_eq!(view.destination.as_deref(), Some("to SEM:A:0:01"));
    }
}
