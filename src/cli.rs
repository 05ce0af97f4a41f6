//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use fleet_report::types::ProjectStatus;

/// Fleet flight report: utilization, distance and finance KPIs
#[derive(Parser, Debug)]
#[command(name = "fleet-report")]
#[command(about = "Operational and financial summary of recorded drone flights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory with flights.csv, drones.csv, projects.csv and finance.csv
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// TOML file with dashboard settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// First day of the window (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day of the window (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Trailing window length in days, ending at the latest flight
    #[arg(long, conflicts_with_all = ["from", "to", "all_dates"])]
    pub last_days: Option<i64>,

    /// Use every recorded date
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub all_dates: bool,

    /// Drone to include (repeatable; default: all drones)
    #[arg(long = "drone")]
    pub drones: Vec<String>,

    /// Project status to include: active, completed (repeatable; default: both)
    #[arg(long = "status")]
    pub statuses: Vec<ProjectStatus>,

    /// Monthly expense target for the finance snapshot
    #[arg(long)]
    pub budget_target: Option<f64>,

    /// Write distribution/weekly/cumulative CSVs and summary.json here
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Rows shown per preview table
    #[arg(long, default_value = "5")]
    pub preview_rows: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
