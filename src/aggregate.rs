//! Grouped, bucketed and cumulative series over a filtered flight view.
//!
//! Every function here is a pure function of the view. Empty input gives
//! empty collections and `None` scalars, never an error.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::filter::FilteredFlights;
use crate::types::{CumulativeRow, DailyCount, DistributionRow, FlightKpis, WeeklyRow};
use crate::util::{km_to_miles, mean, week_start};

/// Shares below this are kept but flagged so the chart can skip the label.
pub const LABEL_THRESHOLD: f64 = 0.08;

/// Everything derived from one filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub kpis: FlightKpis,
    pub distribution: Vec<DistributionRow>,
    pub weekly: Vec<WeeklyRow>,
    pub cumulative: Vec<CumulativeRow>,
    pub daily: Vec<DailyCount>,
}

pub fn aggregate(view: &FilteredFlights<'_>, label_threshold: f64) -> Aggregates {
    Aggregates {
        kpis: flight_kpis(view),
        distribution: distribution_by_drone(view, label_threshold),
        weekly: weekly_counts(view),
        cumulative: cumulative_distance(view),
        daily: daily_counts(view),
    }
}

pub fn flight_kpis(view: &FilteredFlights<'_>) -> FlightKpis {
    let times: Vec<f64> = view.iter().map(|f| f.flight_time_min).collect();
    let photos: Vec<f64> = view.iter().map(|f| f.photos_taken as f64).collect();
    let total_km: f64 = view.iter().map(|f| f.distance_km).sum();

    FlightKpis {
        total_flights: view.len(),
        avg_flight_time_min: mean(&times),
        avg_photos: mean(&photos),
        total_flight_time_min: times.iter().sum(),
        total_photos: view.iter().map(|f| f.photos_taken as u64).sum(),
        total_distance_miles: (!view.is_empty()).then(|| km_to_miles(total_km)),
    }
}

/// Flight counts per drone, ascending by `drone_id`.
///
/// Drones with no flights in the view do not appear. The row order is the
/// ranking order used for tie-breaks downstream.
pub fn distribution_by_drone(view: &FilteredFlights<'_>, label_threshold: f64) -> Vec<DistributionRow> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for f in view.iter() {
        *counts.entry(f.drone_id.as_str()).or_default() += 1;
    }
    let total: usize = counts.values().sum();

    counts
        .into_iter()
        .map(|(drone_id, flights)| {
            let pct = if total == 0 {
                0.0
            } else {
                flights as f64 / total as f64
            };
            DistributionRow {
                drone_id: drone_id.to_string(),
                flights,
                pct,
                label_suppressed: pct < label_threshold,
            }
        })
        .collect()
}

/// Flight counts per Monday-anchored week, chronological, no empty weeks.
pub fn weekly_counts(view: &FilteredFlights<'_>) -> Vec<WeeklyRow> {
    let mut buckets: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for f in view.iter() {
        *buckets.entry(week_start(f.date)).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(week_start, flights)| WeeklyRow {
            week_start,
            flights,
        })
        .collect()
}

/// Flight counts per calendar day, ascending by date.
pub fn daily_counts(view: &FilteredFlights<'_>) -> Vec<DailyCount> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for f in view.iter() {
        *days.entry(f.date).or_default() += 1;
    }
    days.into_iter()
        .map(|(date, flights)| DailyCount { date, flights })
        .collect()
}

/// Running distance per drone in miles, ordered by drone then date.
///
/// Same-day flights of one drone collapse into a single point. The prefix
/// sum runs in kilometers and each point is converted on its own.
pub fn cumulative_distance(view: &FilteredFlights<'_>) -> Vec<CumulativeRow> {
    let mut per_day: BTreeMap<(&str, NaiveDate), f64> = BTreeMap::new();
    for f in view.iter() {
        *per_day.entry((f.drone_id.as_str(), f.date)).or_default() += f.distance_km;
    }

    let mut rows = Vec::with_capacity(per_day.len());
    let mut current: Option<&str> = None;
    let mut cum_km = 0.0;
    for ((drone_id, date), km) in per_day {
        if current != Some(drone_id) {
            current = Some(drone_id);
            cum_km = 0.0;
        }
        cum_km += km;
        rows.push(CumulativeRow {
            drone_id: drone_id.to_string(),
            date,
            cum_distance_miles: km_to_miles(cum_km),
        });
    }
    rows
}
