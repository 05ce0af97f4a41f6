//! Flight filtering by date window, drone selection and project status.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use crate::types::{date_span, Flight, Project, ProjectStatus, RecordStore};

/// Inclusive date window. Either bound may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateWindow {
            start: Some(start),
            end: Some(end),
        }
    }

    /// No bounds at all; resolves to the full observed span.
    pub fn full() -> Self {
        DateWindow::default()
    }

    /// The last `days` days up to the latest flight, clamped to the earliest.
    pub fn trailing_days(flights: &[Flight], days: i64) -> Self {
        match date_span(flights) {
            Some((min, max)) => {
                let start = max
                    .checked_sub_days(Days::new(days.max(0) as u64))
                    .unwrap_or(min)
                    .max(min);
                DateWindow::new(start, max)
            }
            None => DateWindow::full(),
        }
    }

    /// Concrete `(start, end)` for this window over `flights`.
    ///
    /// A partial window, or one whose start lies after its end, falls back
    /// to the full span of `flights`. Returns `None` only without flights.
    pub fn resolve(&self, flights: &[Flight]) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start <= end => Some((start, end)),
            _ => {
                if self.start.is_some() || self.end.is_some() {
                    debug!(window = ?self, "Malformed date window, using full span");
                }
                date_span(flights)
            }
        }
    }
}

/// Everything the operator can select.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub date_window: DateWindow,
    pub selected_drones: BTreeSet<String>,
    pub selected_statuses: BTreeSet<ProjectStatus>,
}

impl FilterSpec {
    /// Every known drone, every status, full date span.
    pub fn everything(store: &RecordStore) -> Self {
        FilterSpec {
            date_window: DateWindow::full(),
            selected_drones: store.drone_ids().into_iter().collect(),
            selected_statuses: ProjectStatus::ALL.into_iter().collect(),
        }
    }

    /// Run the filter over `store`. Selected ids with no drone record are
    /// dropped, so their flights never reach a grouping.
    pub fn apply<'a>(&self, store: &'a RecordStore) -> FilteredFlights<'a> {
        let known: BTreeSet<String> = store
            .drone_ids()
            .into_iter()
            .filter(|id| self.selected_drones.contains(id))
            .collect();
        if known.len() < self.selected_drones.len() {
            debug!(
                unknown = ?self.selected_drones.difference(&known).collect::<Vec<_>>(),
                "Ignoring selected drones without a drone record"
            );
        }
        filter(
            &store.flights,
            &self.date_window,
            &known,
            &self.selected_statuses,
            &store.projects,
        )
    }
}

/// The flights that passed the filter, in input order, plus the window used.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilteredFlights<'a> {
    pub flights: Vec<&'a Flight>,
    pub window: Option<AppliedWindow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppliedWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl<'a> FilteredFlights<'a> {
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Flight> + '_ {
        self.flights.iter().copied()
    }
}

pub fn filter<'a>(
    flights: &'a [Flight],
    date_window: &DateWindow,
    selected_drones: &BTreeSet<String>,
    selected_statuses: &BTreeSet<ProjectStatus>,
    projects: &[Project],
) -> FilteredFlights<'a> {
    let Some((start, end)) = date_window.resolve(flights) else {
        return FilteredFlights::default();
    };

    // Flights whose project is unknown never match.
    let project_ids: HashSet<&str> = projects
        .iter()
        .filter(|p| selected_statuses.contains(&p.status))
        .map(|p| p.project_id.as_str())
        .collect();

    let kept: Vec<&Flight> = flights
        .iter()
        .filter(|f| f.date >= start && f.date <= end)
        .filter(|f| selected_drones.contains(&f.drone_id))
        .filter(|f| project_ids.contains(f.project_id.as_str()))
        .collect();

    debug!(
        total = flights.len(),
        kept = kept.len(),
        %start,
        %end,
        "Filtered flights"
    );

    FilteredFlights {
        flights: kept,
        window: Some(AppliedWindow { start, end }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    pub(crate) fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub(crate) fn flight(id: &str, date: &str, drone: &str, project: &str, km: f64) -> Flight {
        Flight {
            flight_id: id.to_string(),
            date: d(date),
            drone_id: drone.to_string(),
            project_id: project.to_string(),
            flight_time_min: 20.0,
            photos_taken: 100,
            distance_km: km,
        }
    }

    pub(crate) fn project(id: &str, status: ProjectStatus) -> Project {
        Project {
            project_id: id.to_string(),
            status,
            start_date: None,
            end_date: None,
        }
    }

    fn set<T: Ord + Clone>(items: &[T]) -> BTreeSet<T> {
        items.iter().cloned().collect()
    }

    fn sample() -> (Vec<Flight>, Vec<Project>) {
        let flights = vec![
            flight("f1", "2024-01-01", "A", "P1", 10.0),
            flight("f2", "2024-01-05", "B", "P2", 4.0),
            flight("f3", "2024-01-10", "A", "P2", 3.0),
            flight("f4", "2024-01-12", "C", "P1", 1.0),
            flight("f5", "2024-01-15", "A", "PX", 2.0),
        ];
        let projects = vec![
            project("P1", ProjectStatus::Active),
            project("P2", ProjectStatus::Completed),
        ];
        (flights, projects)
    }

    #[test]
    fn test_filter_applies_all_predicates() {
        let (flights, projects) = sample();
        let view = filter(
            &flights,
            &DateWindow::new(d("2024-01-02"), d("2024-01-12")),
            &set(&["A".to_string(), "B".to_string()]),
            &set(&[ProjectStatus::Completed]),
            &projects,
        );
        let ids: Vec<&str> = view.iter().map(|f| f.flight_id.as_str()).collect();
        assert_eq!(ids, vec!["f2", "f3"]);
        assert_eq!(
            view.window,
            Some(AppliedWindow {
                start: d("2024-01-02"),
                end: d("2024-01-12")
            })
        );
    }

    #[test]
    fn test_filter_window_is_inclusive() {
        let (flights, projects) = sample();
        let view = filter(
            &flights,
            &DateWindow::new(d("2024-01-01"), d("2024-01-01")),
            &set(&["A".to_string()]),
            &set(&ProjectStatus::ALL),
            &projects,
        );
        assert_eq!(view.len(), 1);
        assert_eq!(view.flights[0].flight_id, "f1");
    }

    #[test]
    fn test_unknown_project_is_excluded() {
        let (flights, projects) = sample();
        let view = filter(
            &flights,
            &DateWindow::full(),
            &set(&["A".to_string()]),
            &set(&ProjectStatus::ALL),
            &projects,
        );
        assert!(view.iter().all(|f| f.flight_id != "f5"));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_partial_window_falls_back_to_full_span() {
        let (flights, _) = sample();
        let partial = DateWindow {
            start: Some(d("2024-01-10")),
            end: None,
        };
        assert_eq!(
            partial.resolve(&flights),
            Some((d("2024-01-01"), d("2024-01-15")))
        );
        let inverted = DateWindow::new(d("2024-01-10"), d("2024-01-02"));
        assert_eq!(
            inverted.resolve(&flights),
            Some((d("2024-01-01"), d("2024-01-15")))
        );
    }

    #[test]
    fn test_empty_flights_yield_empty_view() {
        let view = filter(
            &[],
            &DateWindow::full(),
            &BTreeSet::new(),
            &set(&ProjectStatus::ALL),
            &[],
        );
        assert!(view.is_empty());
        assert_eq!(view.window, None);
    }

    #[test]
    fn test_trailing_days_clamps_to_first_flight() {
        let (flights, _) = sample();
        assert_eq!(
            DateWindow::trailing_days(&flights, 90),
            DateWindow::new(d("2024-01-01"), d("2024-01-15"))
        );
        assert_eq!(
            DateWindow::trailing_days(&flights, 5),
            DateWindow::new(d("2024-01-10"), d("2024-01-15"))
        );
    }

    #[test]
    fn test_trailing_days_huge_count_clamps_instead_of_overflowing() {
        let flights = vec![flight("f1", "2024-01-01", "A", "P1", 1.0)];
        assert_eq!(
            DateWindow::trailing_days(&flights, 200_000_000),
            DateWindow::new(d("2024-01-01"), d("2024-01-01"))
        );
        assert_eq!(
            DateWindow::trailing_days(&flights, i64::MAX),
            DateWindow::new(d("2024-01-01"), d("2024-01-01"))
        );
    }

    #[test]
    fn test_selected_drone_without_record_is_not_grouped() {
        let store = RecordStore {
            flights: vec![
                flight("f1", "2024-01-01", "A", "P1", 1.0),
                flight("f2", "2024-01-02", "ghost", "P1", 1.0),
            ],
            drones: vec![crate::types::Drone {
                drone_id: "A".to_string(),
                metadata: Default::default(),
            }],
            projects: vec![project("P1", ProjectStatus::Active)],
            finance: vec![],
        };
        let mut spec = FilterSpec::everything(&store);
        spec.selected_drones.insert("ghost".to_string());

        let view = spec.apply(&store);
        assert_eq!(view.len(), 1);
        assert!(view.iter().all(|f| f.drone_id == "A"));

        let dist = crate::aggregate::distribution_by_drone(&view, crate::aggregate::LABEL_THRESHOLD);
        assert_eq!(dist.len(), 1);
        assert_eq!(dist[0].drone_id, "A");
        assert_eq!(dist[0].flights, 1);
    }

    #[test]
    fn test_everything_selects_all_known_drones() {
        let store = RecordStore {
            drones: vec![crate::types::Drone {
                drone_id: "A".to_string(),
                metadata: Default::default(),
            }],
            ..Default::default()
        };
        let spec = FilterSpec::everything(&store);
        assert_eq!(spec.selected_drones, set(&["A".to_string()]));
        assert_eq!(spec.selected_statuses.len(), 2);
    }

    fn arb_flights() -> impl Strategy<Value = Vec<Flight>> {
        prop::collection::vec(
            (0i64..60, 0usize..3, 0usize..3, 0.0f64..50.0),
            0..40,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (day, drone, proj, km))| Flight {
                    flight_id: format!("f{}", i),
                    date: d("2024-01-01") + Duration::days(day),
                    drone_id: ["A", "B", "C"][drone].to_string(),
                    project_id: ["P1", "P2", "P3"][proj].to_string(),
                    flight_time_min: 10.0,
                    photos_taken: 5,
                    distance_km: km,
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_filtered_flights_satisfy_predicates(
            flights in arb_flights(),
            from in 0i64..60,
            len in 0i64..60,
            drone_mask in 0u8..8,
        ) {
            let projects = vec![
                project("P1", ProjectStatus::Active),
                project("P2", ProjectStatus::Completed),
            ];
            let start = d("2024-01-01") + Duration::days(from);
            let end = start + Duration::days(len);
            let drones: BTreeSet<String> = ["A", "B", "C"]
                .iter()
                .enumerate()
                .filter(|(i, _)| drone_mask & (1 << i) != 0)
                .map(|(_, s)| s.to_string())
                .collect();
            let statuses = set(&[ProjectStatus::Active]);

            let view = filter(&flights, &DateWindow::new(start, end), &drones, &statuses, &projects);

            prop_assert!(view.len() <= flights.len());
            for f in view.iter() {
                prop_assert!(f.date >= start && f.date <= end);
                prop_assert!(drones.contains(&f.drone_id));
                prop_assert_eq!(f.project_id.as_str(), "P1");
            }
            // Relative order is preserved.
            let positions: Vec<usize> = view
                .iter()
                .map(|f| flights.iter().position(|g| g.flight_id == f.flight_id).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
