use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

use crate::util::{format_number, format_percent};

// ---------------------------------------------------------------------------
// Raw CSV rows. Every column is optional text so one bad cell skips one row
// instead of aborting the whole file.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RawFlight {
    pub flight_id: Option<String>,
    pub date: Option<String>,
    pub drone_id: Option<String>,
    pub project_id: Option<String>,
    pub flight_time_min: Option<String>,
    pub photos_taken: Option<String>,
    pub distance_km: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawProject {
    pub project_id: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawFinance {
    pub month: Option<String>,
    pub expense: Option<String>,
    pub revenue: Option<String>,
    pub goal_annual: Option<String>,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flight {
    pub flight_id: String,
    pub date: NaiveDate,
    pub drone_id: String,
    pub project_id: String,
    pub flight_time_min: f64,
    pub photos_taken: u32,
    pub distance_km: f64,
}

/// A drone unit. Columns other than `drone_id` are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drone {
    pub drone_id: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 2] = [ProjectStatus::Active, ProjectStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "completed" => Ok(ProjectStatus::Completed),
            other => Err(format!("Unknown project status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub project_id: String,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Calendar month key used by the finance ledger, ordered by year then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Accepts `YYYY-MM`, and `YYYY-MM-DD` with the day ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.split('-');
        let year = parts.next().and_then(|p| p.parse::<i32>().ok());
        let month = parts.next().and_then(|p| p.parse::<u32>().ok());
        let day_ok = match parts.next() {
            None => true,
            Some(d) => d.parse::<u32>().map(|d| (1..=31).contains(&d)).unwrap_or(false),
        };
        match (year, month) {
            (Some(y), Some(m)) if day_ok && parts.next().is_none() => {
                YearMonth::new(y, m).ok_or_else(|| format!("Invalid month: {}", s))
            }
            _ => Err(format!("Invalid month: {}", s)),
        }
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceRecord {
    pub month: YearMonth,
    pub expense: f64,
    pub revenue: f64,
    pub goal_annual: f64,
}

/// The four record sets, loaded once and only ever read afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    pub flights: Vec<Flight>,
    pub drones: Vec<Drone>,
    pub projects: Vec<Project>,
    pub finance: Vec<FinanceRecord>,
}

impl RecordStore {
    pub fn drone_ids(&self) -> Vec<String> {
        self.drones.iter().map(|d| d.drone_id.clone()).collect()
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.project_id == project_id)
    }

    /// Earliest and latest flight date, or `None` without flights.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        date_span(&self.flights)
    }
}

pub fn date_span(flights: &[Flight]) -> Option<(NaiveDate, NaiveDate)> {
    let min = flights.iter().map(|f| f.date).min()?;
    let max = flights.iter().map(|f| f.date).max()?;
    Some((min, max))
}

// ---------------------------------------------------------------------------
// Engine outputs
// ---------------------------------------------------------------------------

/// Scalar KPIs over the filtered view. `None` means "no value".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightKpis {
    pub total_flights: usize,
    pub avg_flight_time_min: Option<f64>,
    pub avg_photos: Option<f64>,
    pub total_flight_time_min: f64,
    pub total_photos: u64,
    pub total_distance_miles: Option<f64>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct DistributionRow {
    #[tabled(rename = "Drone")]
    pub drone_id: String,
    #[tabled(rename = "Flights")]
    pub flights: usize,
    #[tabled(rename = "Share", display_with = "display_share")]
    pub pct: f64,
    #[tabled(rename = "LabelSuppressed")]
    pub label_suppressed: bool,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct WeeklyRow {
    #[tabled(rename = "WeekOf")]
    pub week_start: NaiveDate,
    #[tabled(rename = "Flights")]
    pub flights: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CumulativeRow {
    #[tabled(rename = "Drone")]
    pub drone_id: String,
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[tabled(rename = "CumMiles", display_with = "display_miles")]
    pub cum_distance_miles: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub flights: usize,
}

/// Latest month's expense against the configured budget target.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ExpenseSnapshot {
    pub month: YearMonth,
    pub expense: f64,
    pub budget_target: f64,
    pub variance: f64,
    pub over_budget: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RevenueProgress {
    pub ytd_revenue: f64,
    pub pct_of_goal: i64,
    pub annual_goal: f64,
}

fn display_share(pct: &f64) -> String {
    format_percent(*pct)
}

fn display_miles(miles: &f64) -> String {
    format_number(*miles, 1)
}
