use crate::error::{Error, Result};
use crate::types::{
    Drone, FinanceRecord, Flight, Project, ProjectStatus, RawFinance, RawFlight, RawProject,
    RecordStore, YearMonth,
};
use crate::util::{parse_date_safe, parse_f64_safe, parse_text, parse_u32_safe};
use csv::{Reader, ReaderBuilder};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

pub const FLIGHTS_FILE: &str = "flights.csv";
pub const DRONES_FILE: &str = "drones.csv";
pub const PROJECTS_FILE: &str = "projects.csv";
pub const FINANCE_FILE: &str = "finance.csv";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
}

impl FileReport {
    fn loaded(&mut self) {
        self.total_rows += 1;
        self.loaded_rows += 1;
    }

    fn skipped(&mut self) {
        self.total_rows += 1;
        self.skipped_rows += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub flights: FileReport,
    pub drones: FileReport,
    pub projects: FileReport,
    pub finance: FileReport,
}

/// Load the four record sets from `dir`.
///
/// Unparseable rows are skipped and counted; a missing file is an error.
pub fn load_store(dir: &Path) -> Result<(RecordStore, LoadReport)> {
    let (flights, flight_report) = load_flights(&dir.join(FLIGHTS_FILE))?;
    let (drones, drone_report) = load_drones(&dir.join(DRONES_FILE))?;
    let (projects, project_report) = load_projects(&dir.join(PROJECTS_FILE))?;
    let (finance, finance_report) = load_finance(&dir.join(FINANCE_FILE))?;

    info!(
        flights = flights.len(),
        drones = drones.len(),
        projects = projects.len(),
        months = finance.len(),
        "Loaded records from {}",
        dir.display()
    );

    let store = RecordStore {
        flights,
        drones,
        projects,
        finance,
    };
    let report = LoadReport {
        flights: flight_report,
        drones: drone_report,
        projects: project_report,
        finance: finance_report,
    };
    Ok((store, report))
}

fn open(path: &Path) -> Result<Reader<File>> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }
    Ok(ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

fn warn_skipped(path: &Path, report: &FileReport) {
    if report.skipped_rows > 0 {
        warn!(
            "Skipped {} of {} rows in {}",
            report.skipped_rows,
            report.total_rows,
            path.display()
        );
    }
}

pub fn load_flights(path: &Path) -> Result<(Vec<Flight>, FileReport)> {
    let mut rdr = open(path)?;
    let mut report = FileReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut flights = Vec::new();

    for result in rdr.deserialize::<RawFlight>() {
        let Ok(row) = result else {
            report.skipped();
            continue;
        };
        match clean_flight(row) {
            // First occurrence of an id wins.
            Some(f) if seen.insert(f.flight_id.clone()) => {
                report.loaded();
                flights.push(f);
            }
            _ => report.skipped(),
        }
    }
    warn_skipped(path, &report);
    Ok((flights, report))
}

fn clean_flight(row: RawFlight) -> Option<Flight> {
    Some(Flight {
        flight_id: parse_text(row.flight_id)?,
        date: parse_date_safe(row.date.as_deref())?,
        drone_id: parse_text(row.drone_id)?,
        project_id: parse_text(row.project_id)?,
        flight_time_min: parse_f64_safe(row.flight_time_min.as_deref())?,
        photos_taken: parse_u32_safe(row.photos_taken.as_deref())?,
        distance_km: parse_f64_safe(row.distance_km.as_deref())?,
    })
}

/// Drones carry free-form metadata, so rows are read as plain records
/// keyed by header rather than into a fixed struct.
pub fn load_drones(path: &Path) -> Result<(Vec<Drone>, FileReport)> {
    let mut rdr = open(path)?;
    let headers = rdr.headers()?.clone();
    let id_col = headers
        .iter()
        .position(|h| h == "drone_id")
        .ok_or_else(|| Error::InvalidData(format!("{} has no drone_id column", path.display())))?;

    let mut report = FileReport::default();
    let mut drones = Vec::new();
    for result in rdr.records() {
        let Ok(record) = result else {
            report.skipped();
            continue;
        };
        let Some(drone_id) = parse_text(record.get(id_col).map(str::to_string)) else {
            report.skipped();
            continue;
        };
        let metadata: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .enumerate()
            .filter(|(i, _)| *i != id_col)
            .map(|(_, (h, v))| (h.to_string(), v.to_string()))
            .collect();
        report.loaded();
        drones.push(Drone { drone_id, metadata });
    }
    warn_skipped(path, &report);
    Ok((drones, report))
}

pub fn load_projects(path: &Path) -> Result<(Vec<Project>, FileReport)> {
    let mut rdr = open(path)?;
    let mut report = FileReport::default();
    let mut projects = Vec::new();

    for result in rdr.deserialize::<RawProject>() {
        let cleaned = result.ok().and_then(|row| {
            Some(Project {
                project_id: parse_text(row.project_id)?,
                status: row.status.as_deref()?.parse::<ProjectStatus>().ok()?,
                start_date: parse_date_safe(row.start_date.as_deref()),
                end_date: parse_date_safe(row.end_date.as_deref()),
            })
        });
        match cleaned {
            Some(p) => {
                report.loaded();
                projects.push(p);
            }
            None => report.skipped(),
        }
    }
    warn_skipped(path, &report);
    Ok((projects, report))
}

pub fn load_finance(path: &Path) -> Result<(Vec<FinanceRecord>, FileReport)> {
    let mut rdr = open(path)?;
    let mut report = FileReport::default();
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawFinance>() {
        let cleaned = result.ok().and_then(|row| {
            Some(FinanceRecord {
                month: row.month.as_deref()?.parse::<YearMonth>().ok()?,
                expense: parse_f64_safe(row.expense.as_deref())?,
                revenue: parse_f64_safe(row.revenue.as_deref())?,
                goal_annual: parse_f64_safe(row.goal_annual.as_deref())?,
            })
        });
        match cleaned {
            Some(r) => {
                report.loaded();
                records.push(r);
            }
            None => report.skipped(),
        }
    }
    warn_skipped(path, &report);
    Ok((records, report))
}
