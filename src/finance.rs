//! Month-over-month and year-to-date finance KPIs.
//!
//! These work on the whole ledger; the flight filter does not apply.
//! Both return `None` ("unavailable") for an empty ledger.

use serde::Serialize;

use crate::types::{ExpenseSnapshot, FinanceRecord, RevenueProgress};

/// Monthly expense target used when nothing else is configured.
pub const DEFAULT_BUDGET_TARGET: f64 = 9000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceSummary {
    pub current_month: Option<ExpenseSnapshot>,
    pub ytd: Option<RevenueProgress>,
}

pub fn summarize(records: &[FinanceRecord], budget_target: f64) -> FinanceSummary {
    FinanceSummary {
        current_month: current_month_snapshot(records, budget_target),
        ytd: ytd_revenue_progress(records),
    }
}

/// Expense of the latest month against `budget_target`.
///
/// If several records share the latest month the first one wins.
pub fn current_month_snapshot(records: &[FinanceRecord], budget_target: f64) -> Option<ExpenseSnapshot> {
    let latest = records
        .iter()
        .reduce(|best, r| if r.month > best.month { r } else { best })?;
    let variance = latest.expense - budget_target;
    Some(ExpenseSnapshot {
        month: latest.month,
        expense: latest.expense,
        budget_target,
        variance,
        over_budget: variance > 0.0,
    })
}

/// Summed revenue as a whole percentage of the annual goal, truncated.
///
/// The goal is read from the first record. A zero goal gives `0`.
pub fn ytd_revenue_progress(records: &[FinanceRecord]) -> Option<RevenueProgress> {
    let annual_goal = records.first()?.goal_annual;
    let ytd_revenue: f64 = records.iter().map(|r| r.revenue).sum();
    let pct_of_goal = if annual_goal == 0.0 {
        0
    } else {
        let pct = 100.0 * ytd_revenue / annual_goal;
        if pct.is_finite() {
            pct.trunc() as i64
        } else {
            0
        }
    };
    Some(RevenueProgress {
        ytd_revenue,
        pct_of_goal,
        annual_goal,
    })
}
