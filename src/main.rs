// Entry point and high-level CLI flow.
//
// - Load the four CSVs once and print load diagnostics.
// - Turn the flags into a filter, build the dashboard and print it.
// - Optionally export every series for a chart layer.
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeSet;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use fleet_report::config::DashboardConfig;
use fleet_report::dashboard::{self, DashboardReport};
use fleet_report::filter::{DateWindow, FilterSpec};
use fleet_report::loader::{self, LoadReport};
use fleet_report::output::preview_table;
use fleet_report::types::{ProjectStatus, RecordStore};
use fleet_report::util::{format_int, format_number, format_optional};

fn init_logging(verbose: bool) {
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn resolve_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(target) = cli.budget_target {
        config.budget_target = target;
    }
    Ok(config)
}

fn filter_spec(cli: &Cli, store: &RecordStore, config: &DashboardConfig) -> FilterSpec {
    let date_window = if cli.all_dates {
        DateWindow::full()
    } else if cli.from.is_some() || cli.to.is_some() {
        DateWindow {
            start: cli.from,
            end: cli.to,
        }
    } else {
        let days = cli.last_days.unwrap_or(config.default_window_days);
        DateWindow::trailing_days(&store.flights, days)
    };

    let selected_drones: BTreeSet<String> = if cli.drones.is_empty() {
        store.drone_ids().into_iter().collect()
    } else {
        let known = store.drone_ids();
        for id in cli.drones.iter().filter(|id| !known.contains(id)) {
            warn!("Unknown drone {}, ignoring", id);
        }
        cli.drones.iter().cloned().collect()
    };
    let selected_statuses: BTreeSet<ProjectStatus> = if cli.statuses.is_empty() {
        ProjectStatus::ALL.into_iter().collect()
    } else {
        cli.statuses.iter().copied().collect()
    };

    FilterSpec {
        date_window,
        selected_drones,
        selected_statuses,
    }
}

fn print_load_report(report: &LoadReport) {
    println!(
        "Processing dataset... ({} flights, {} drones, {} projects, {} finance months loaded)",
        format_int(report.flights.loaded_rows),
        format_int(report.drones.loaded_rows),
        format_int(report.projects.loaded_rows),
        format_int(report.finance.loaded_rows)
    );
    let skipped = report.flights.skipped_rows
        + report.drones.skipped_rows
        + report.projects.skipped_rows
        + report.finance.skipped_rows;
    if skipped > 0 {
        println!(
            "Note: {} rows skipped due to parse/validation errors.",
            format_int(skipped)
        );
    }
    println!();
}

fn print_report(report: &DashboardReport, preview_rows: usize) {
    let aggs = &report.aggregates;
    let kpis = &aggs.kpis;

    println!("Drone Flight Dashboard");
    if let Some(window) = report.window {
        println!("(Window: {} to {})", window.start, window.end);
    }
    println!();
    println!("Total Flights: {}", format_int(kpis.total_flights));
    println!(
        "Avg Flight Time (min): {}",
        format_optional(kpis.avg_flight_time_min, 1)
    );
    println!("Avg Photos / Flight: {}", format_optional(kpis.avg_photos, 0));
    println!(
        "Total Distance (miles): {}\n",
        format_optional(kpis.total_distance_miles, 1)
    );

    preview_table(
        "Flights by Drone",
        "share per drone; small shares are flagged for unlabeled display",
        &aggs.distribution,
        preview_rows,
    );
    preview_table(
        "Flights in Selected Range (Weekly)",
        "weeks start on Monday",
        &aggs.weekly,
        preview_rows,
    );
    preview_table(
        "Cumulative Distance by Drone (miles)",
        "running total per drone",
        &aggs.cumulative,
        preview_rows,
    );

    println!("Finance Snapshot");
    match &report.finance.current_month {
        Some(snap) => println!(
            "Current Month Expense vs Budget ({}): ${} (Target ${})",
            snap.month,
            format_number(snap.expense, 0),
            format_number(snap.budget_target, 0)
        ),
        None => println!("Current Month Expense vs Budget: unavailable"),
    }
    match &report.finance.ytd {
        Some(ytd) => println!(
            "YTD Revenue Progress: ${} ({}% of ${})",
            format_number(ytd.ytd_revenue, 0),
            ytd.pct_of_goal,
            format_number(ytd.annual_goal, 0)
        ),
        None => println!("YTD Revenue Progress: unavailable"),
    }
    println!();

    println!("Insights");
    for insight in &report.insights {
        println!("- {}", insight);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = resolve_config(&cli)?;
    let (store, load_report) = loader::load_store(&config.data_dir)
        .with_context(|| format!("Failed to load data from {}", config.data_dir.display()))?;
    print_load_report(&load_report);

    let spec = filter_spec(&cli, &store, &config);
    let report = dashboard::build(&store, &spec, &config);
    print_report(&report, cli.preview_rows);

    if let Some(dir) = &cli.out_dir {
        dashboard::export(&report, dir)
            .with_context(|| format!("Failed to write outputs to {}", dir.display()))?;
        println!("\n(Full tables exported to {})", dir.display());
    }
    Ok(())
}
