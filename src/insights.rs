//! Ranked facts about the filtered view, rendered as short statements.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::aggregate::Aggregates;
use crate::filter::FilteredFlights;
use crate::types::{DailyCount, DistributionRow};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    Utilization {
        drone_id: String,
    },
    OperationalLoad {
        date: NaiveDate,
        flights: usize,
    },
    Efficiency {
        avg_flight_time_min: f64,
        avg_photos: f64,
    },
    Distance {
        total_miles: f64,
    },
    NoInsights,
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insight::Utilization { drone_id } => write!(
                f,
                "Utilization: Drone {} has the most flights in the selected period.",
                drone_id
            ),
            Insight::OperationalLoad { date, flights } => write!(
                f,
                "Operational load: Peak day was {} with {} flights.",
                date.format("%Y-%m-%d"),
                flights
            ),
            Insight::Efficiency {
                avg_flight_time_min,
                avg_photos,
            } => write!(
                f,
                "Efficiency: Average flight time is {:.1} min and average photos per flight is {:.0}.",
                avg_flight_time_min, avg_photos
            ),
            Insight::Distance { total_miles } => write!(
                f,
                "Distance: Total distance flown is {:.1} miles across all selected drones.",
                total_miles
            ),
            Insight::NoInsights => write!(f, "No insights: try broadening your filters."),
        }
    }
}

/// Drone with the most flights. Ties go to the earliest row.
pub fn top_drone(distribution: &[DistributionRow]) -> Option<&DistributionRow> {
    distribution
        .iter()
        .reduce(|best, row| if row.flights > best.flights { row } else { best })
}

/// Day with the most flights. Ties go to the earliest date.
pub fn busiest_day(daily: &[DailyCount]) -> Option<&DailyCount> {
    daily
        .iter()
        .reduce(|best, day| if day.flights > best.flights { day } else { best })
}

/// Utilization, operational load, efficiency and distance, in that order.
/// An empty view yields the single `NoInsights` statement.
pub fn generate(view: &FilteredFlights<'_>, aggs: &Aggregates) -> Vec<Insight> {
    if view.is_empty() {
        return vec![Insight::NoInsights];
    }
    let (Some(top), Some(peak), Some(avg_time), Some(avg_photos), Some(total_miles)) = (
        top_drone(&aggs.distribution),
        busiest_day(&aggs.daily),
        aggs.kpis.avg_flight_time_min,
        aggs.kpis.avg_photos,
        aggs.kpis.total_distance_miles,
    ) else {
        return vec![Insight::NoInsights];
    };

    vec![
        Insight::Utilization {
            drone_id: top.drone_id.clone(),
        },
        Insight::OperationalLoad {
            date: peak.date,
            flights: peak.flights,
        },
        Insight::Efficiency {
            avg_flight_time_min: avg_time,
            avg_photos,
        },
        Insight::Distance { total_miles },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, LABEL_THRESHOLD};
    use crate::filter::tests::{d, flight};
    use crate::types::Flight;

    fn view(flights: &[Flight]) -> FilteredFlights<'_> {
        FilteredFlights {
            flights: flights.iter().collect(),
            window: None,
        }
    }

    #[test]
    fn test_four_statements_in_order() {
        let flights = vec![
            flight("d1", "2024-01-01", "droneA", "P1", 10.0),
            flight("d2", "2024-01-03", "droneA", "P1", 5.0),
            flight("d3", "2024-01-01", "droneB", "P1", 2.0),
        ];
        let v = view(&flights);
        let insights = generate(&v, &aggregate(&v, LABEL_THRESHOLD));

        assert_eq!(insights.len(), 4);
        assert_eq!(
            insights[0],
            Insight::Utilization {
                drone_id: "droneA".to_string()
            }
        );
        assert_eq!(
            insights[1],
            Insight::OperationalLoad {
                date: d("2024-01-01"),
                flights: 2
            }
        );
        assert_eq!(
            insights[2].to_string(),
            "Efficiency: Average flight time is 20.0 min and average photos per flight is 100."
        );
        assert_eq!(
            insights[3].to_string(),
            "Distance: Total distance flown is 10.6 miles across all selected drones."
        );
    }

    #[test]
    fn test_ties_go_to_first_in_ranked_order() {
        let flights = vec![
            flight("f1", "2024-01-05", "B", "P1", 1.0),
            flight("f2", "2024-01-02", "A", "P1", 1.0),
        ];
        let v = view(&flights);
        let insights = generate(&v, &aggregate(&v, LABEL_THRESHOLD));

        assert_eq!(
            insights[0],
            Insight::Utilization {
                drone_id: "A".to_string()
            }
        );
        assert_eq!(
            insights[1],
            Insight::OperationalLoad {
                date: d("2024-01-02"),
                flights: 1
            }
        );
    }

    #[test]
    fn test_empty_view_collapses_to_one_statement() {
        let v = FilteredFlights::default();
        let insights = generate(&v, &aggregate(&v, LABEL_THRESHOLD));
        assert_eq!(insights, vec![Insight::NoInsights]);
        assert_eq!(
            insights[0].to_string(),
            "No insights: try broadening your filters."
        );
    }

    #[test]
    fn test_operational_load_wording() {
        let insight = Insight::OperationalLoad {
            date: d("2024-06-09"),
            flights: 7,
        };
        assert_eq!(
            insight.to_string(),
            "Operational load: Peak day was 2024-06-09 with 7 flights."
        );
    }

    #[test]
    fn test_top_drone_of_empty_distribution() {
        assert!(top_drone(&[]).is_none());
        assert!(busiest_day(&[]).is_none());
    }
}
