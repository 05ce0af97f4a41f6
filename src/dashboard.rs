//! One full pass over the records: filter, aggregate, summarize finance,
//! derive insights. Nothing is cached between passes.

use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::aggregate::{aggregate, Aggregates};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::filter::{AppliedWindow, FilterSpec};
use crate::finance::{summarize, FinanceSummary};
use crate::insights::{generate, Insight};
use crate::output::{write_csv, write_json};
use crate::types::{FlightKpis, RecordStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub window: Option<AppliedWindow>,
    pub aggregates: Aggregates,
    pub finance: FinanceSummary,
    pub insights: Vec<Insight>,
}

/// What goes into `summary.json`; the row series get their own CSV files.
#[derive(Debug, Serialize)]
struct Summary<'a> {
    window: Option<AppliedWindow>,
    kpis: &'a FlightKpis,
    finance: &'a FinanceSummary,
    insights: &'a [Insight],
    insight_text: Vec<String>,
}

pub fn build(store: &RecordStore, spec: &FilterSpec, config: &DashboardConfig) -> DashboardReport {
    let view = spec.apply(store);
    let aggregates = aggregate(&view, config.label_threshold);
    let insights = generate(&view, &aggregates);
    let finance = summarize(&store.finance, config.budget_target);

    debug!(
        flights = view.len(),
        drones = aggregates.distribution.len(),
        weeks = aggregates.weekly.len(),
        "Built dashboard"
    );

    DashboardReport {
        window: view.window,
        aggregates,
        finance,
        insights,
    }
}

pub const DISTRIBUTION_FILE: &str = "distribution.csv";
pub const WEEKLY_FILE: &str = "weekly.csv";
pub const CUMULATIVE_FILE: &str = "cumulative.csv";
pub const SUMMARY_FILE: &str = "summary.json";

/// Write every series as CSV and the scalars plus insights as JSON.
pub fn export(report: &DashboardReport, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    write_csv(&dir.join(DISTRIBUTION_FILE), &report.aggregates.distribution)?;
    write_csv(&dir.join(WEEKLY_FILE), &report.aggregates.weekly)?;
    write_csv(&dir.join(CUMULATIVE_FILE), &report.aggregates.cumulative)?;

    let summary = Summary {
        window: report.window,
        kpis: &report.aggregates.kpis,
        finance: &report.finance,
        insights: &report.insights,
        insight_text: report.insights.iter().map(|i| i.to_string()).collect(),
    };
    write_json(&dir.join(SUMMARY_FILE), &summary)?;

    info!("Exported dashboard to {}", dir.display());
    Ok(())
}
