//! The static KPI definition registry and its built-in computations.
//!
//! The catalog is compiled in and immutable at runtime. Every rollup
//! evaluates exactly this list; `computed + skipped` in a result always
//! covers it once each. Computation functions are pure over a
//! [`RollupContext`] and carry no state of their own.

use anyhow::Result;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::context::RollupContext;
use crate::governance::GovernanceFlag;
use crate::result::{KpiDetail, KpiStatus};

/// Version stamped into every computed KPI payload and the result envelope.
/// Bump whenever any computation rule changes, so persisted results remain
/// attributable to the rules that produced them.
pub const ENGINE_VERSION: &str = "1.0.0";

// KPI codes, matching the platform's KPI-code dimension table.
const KPI_SPI: &str = "spi";
const KPI_SCHEDULE_VARIANCE: &str = "schedule_variance";
const KPI_BUDGET_BURN: &str = "budget_burn";
const KPI_FORECAST_AT_COMPLETION: &str = "forecast_at_completion";
const KPI_OPEN_RISK_COUNT: &str = "open_risk_count";
const KPI_CHANGE_REQUEST_APPROVAL_RATE: &str = "change_request_approval_rate";
const KPI_THROUGHPUT: &str = "throughput";
const KPI_WIP: &str = "wip";

// Change-request decision states relevant to the approval rate.
const CR_STATUS_APPROVED: &str = "APPROVED";
const CR_STATUS_REJECTED: &str = "REJECTED";

// Status thresholds.
const SPI_OK_THRESHOLD: f64 = 0.95;
const SPI_WARNING_THRESHOLD: f64 = 0.80;
const OPEN_RISK_WARNING_THRESHOLD: usize = 10;

/// Measurement unit attached to a KPI definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiUnit {
    Ratio,
    Number,
    Currency,
    Count,
}

/// What a single KPI computation yields before assembly wraps it.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiComputation {
    /// `None` exactly when `status` is [`KpiStatus::NoData`].
    pub value: Option<f64>,
    pub status: KpiStatus,
    pub detail: KpiDetail,
}

impl KpiComputation {
    fn no_data(detail: KpiDetail) -> Self {
        Self {
            value: None,
            status: KpiStatus::NoData,
            detail,
        }
    }
}

/// One entry in the compiled-in KPI catalog.
#[derive(Debug, Clone, Copy)]
pub struct KpiDefinition {
    pub code: &'static str,
    pub name: &'static str,
    pub unit: KpiUnit,
    /// KPIs whose underlying data model is only guaranteed when a
    /// methodology flag is on; `None` means always computed.
    pub required_governance_flag: Option<GovernanceFlag>,
    pub compute: fn(&RollupContext) -> Result<KpiComputation>,
}

static REGISTRY: [KpiDefinition; 8] = [
    KpiDefinition {
        code: KPI_SPI,
        name: "Schedule Performance Index",
        unit: KpiUnit::Ratio,
        required_governance_flag: Some(GovernanceFlag::Baselines),
        compute: compute_spi,
    },
    KpiDefinition {
        code: KPI_SCHEDULE_VARIANCE,
        name: "Schedule Variance",
        unit: KpiUnit::Number,
        required_governance_flag: Some(GovernanceFlag::Baselines),
        compute: compute_schedule_variance,
    },
    KpiDefinition {
        code: KPI_BUDGET_BURN,
        name: "Budget Burn",
        unit: KpiUnit::Ratio,
        required_governance_flag: Some(GovernanceFlag::CostTracking),
        compute: compute_budget_burn,
    },
    KpiDefinition {
        code: KPI_FORECAST_AT_COMPLETION,
        name: "Forecast at Completion",
        unit: KpiUnit::Currency,
        required_governance_flag: Some(GovernanceFlag::CostTracking),
        compute: compute_forecast_at_completion,
    },
    KpiDefinition {
        code: KPI_OPEN_RISK_COUNT,
        name: "Open Risks",
        unit: KpiUnit::Count,
        required_governance_flag: None,
        compute: compute_open_risk_count,
    },
    KpiDefinition {
        code: KPI_CHANGE_REQUEST_APPROVAL_RATE,
        name: "Change Request Approval Rate",
        unit: KpiUnit::Ratio,
        required_governance_flag: Some(GovernanceFlag::ChangeManagement),
        compute: compute_change_request_approval_rate,
    },
    KpiDefinition {
        code: KPI_THROUGHPUT,
        name: "Throughput",
        unit: KpiUnit::Count,
        required_governance_flag: None,
        compute: compute_throughput,
    },
    KpiDefinition {
        code: KPI_WIP,
        name: "Work in Progress",
        unit: KpiUnit::Count,
        required_governance_flag: None,
        compute: compute_wip,
    },
];

/// The immutable, ordered KPI catalog.
pub fn registry() -> &'static [KpiDefinition] {
    &REGISTRY
}

// =============================================================================
// NUMERIC HELPERS
// =============================================================================

const RATIO_SCALE: f64 = 10_000.0;

/// Round a ratio to four decimal places so hashes and cross-platform
/// comparisons stay stable.
fn round_ratio(value: f64) -> f64 {
    (value * RATIO_SCALE).round() / RATIO_SCALE
}

fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Sum of each contributing project's latest value for `kpi_code`, plus the
/// contributing-project count. `None` when no project reports the code.
fn summed_latest(context: &RollupContext, kpi_code: &str) -> (Option<f64>, usize) {
    let values = context.latest_values_for(kpi_code);
    if values.is_empty() {
        (None, 0)
    } else {
        (Some(values.iter().sum()), values.len())
    }
}

// =============================================================================
// BUILT-IN COMPUTATIONS
// =============================================================================

fn compute_spi(context: &RollupContext) -> Result<KpiComputation> {
    let values = context.latest_values_for(KPI_SPI);
    if values.is_empty() {
        return Ok(KpiComputation::no_data(KpiDetail::LatestAverage {
            contributing_projects: 0,
        }));
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let value = round_ratio(mean);
    let status = if value >= SPI_OK_THRESHOLD {
        KpiStatus::Ok
    } else if value >= SPI_WARNING_THRESHOLD {
        KpiStatus::Warning
    } else {
        KpiStatus::Breach
    };

    Ok(KpiComputation {
        value: Some(value),
        status,
        detail: KpiDetail::LatestAverage {
            contributing_projects: values.len(),
        },
    })
}

fn compute_schedule_variance(context: &RollupContext) -> Result<KpiComputation> {
    let (sum, contributing) = summed_latest(context, KPI_SCHEDULE_VARIANCE);
    let Some(sum) = sum else {
        return Ok(KpiComputation::no_data(KpiDetail::LatestSum {
            contributing_projects: 0,
        }));
    };

    // Negative variance only ever warns; this KPI has no breach tier.
    let status = if sum < 0.0 {
        KpiStatus::Warning
    } else {
        KpiStatus::Ok
    };

    Ok(KpiComputation {
        value: Some(sum),
        status,
        detail: KpiDetail::LatestSum {
            contributing_projects: contributing,
        },
    })
}

fn compute_budget_burn(context: &RollupContext) -> Result<KpiComputation> {
    let baseline: Decimal = context.budgets.iter().map(|b| b.baseline_budget).sum();
    let revised: Decimal = context.budgets.iter().map(|b| b.revised_budget).sum();

    // Zero baseline covers both "no budget rows" and "all-zero baselines".
    if baseline.is_zero() {
        return Ok(KpiComputation::no_data(KpiDetail::BudgetBurn {
            baseline_total: decimal_to_f64(baseline),
            revised_total: decimal_to_f64(revised),
        }));
    }

    let value = round_ratio(decimal_to_f64(revised) / decimal_to_f64(baseline));
    let status = if value > 1.0 {
        KpiStatus::Warning
    } else {
        KpiStatus::Ok
    };

    Ok(KpiComputation {
        value: Some(value),
        status,
        detail: KpiDetail::BudgetBurn {
            baseline_total: decimal_to_f64(baseline),
            revised_total: decimal_to_f64(revised),
        },
    })
}

fn compute_forecast_at_completion(context: &RollupContext) -> Result<KpiComputation> {
    if context.budgets.is_empty() {
        return Ok(KpiComputation::no_data(KpiDetail::ForecastTotal {
            budget_rows: 0,
        }));
    }

    let total: Decimal = context
        .budgets
        .iter()
        .map(|b| b.forecast_at_completion)
        .sum();

    Ok(KpiComputation {
        value: Some(decimal_to_f64(total)),
        status: KpiStatus::Ok,
        detail: KpiDetail::ForecastTotal {
            budget_rows: context.budgets.len(),
        },
    })
}

fn compute_open_risk_count(context: &RollupContext) -> Result<KpiComputation> {
    // Never NO_DATA: an empty risk register is a real answer of zero.
    let open = context.open_risks.len();
    let status = if open > OPEN_RISK_WARNING_THRESHOLD {
        KpiStatus::Warning
    } else {
        KpiStatus::Ok
    };

    Ok(KpiComputation {
        value: Some(open as f64),
        status,
        detail: KpiDetail::RiskCount { open_risks: open },
    })
}

fn compute_change_request_approval_rate(context: &RollupContext) -> Result<KpiComputation> {
    let total = context.change_requests.len();
    let approved = context
        .change_requests
        .iter()
        .filter(|cr| cr.status == CR_STATUS_APPROVED)
        .count();
    let rejected = context
        .change_requests
        .iter()
        .filter(|cr| cr.status == CR_STATUS_REJECTED)
        .count();
    let decided = approved + rejected;

    let detail = KpiDetail::ApprovalRate {
        approved,
        rejected,
        undecided: total - decided,
    };

    // Undecided requests (SUBMITTED, DRAFT, ...) never enter the denominator.
    if total == 0 || decided == 0 {
        return Ok(KpiComputation::no_data(detail));
    }

    Ok(KpiComputation {
        value: Some(round_ratio(approved as f64 / decided as f64)),
        status: KpiStatus::Ok,
        detail,
    })
}

fn compute_throughput(context: &RollupContext) -> Result<KpiComputation> {
    let (sum, contributing) = summed_latest(context, KPI_THROUGHPUT);
    Ok(match sum {
        Some(value) => KpiComputation {
            value: Some(value),
            status: KpiStatus::Ok,
            detail: KpiDetail::LatestSum {
                contributing_projects: contributing,
            },
        },
        None => KpiComputation::no_data(KpiDetail::LatestSum {
            contributing_projects: 0,
        }),
    })
}

fn compute_wip(context: &RollupContext) -> Result<KpiComputation> {
    let (sum, contributing) = summed_latest(context, KPI_WIP);
    Ok(match sum {
        Some(value) => KpiComputation {
            value: Some(value),
            status: KpiStatus::Ok,
            detail: KpiDetail::LatestSum {
                contributing_projects: contributing,
            },
        },
        None => KpiComputation::no_data(KpiDetail::LatestSum {
            contributing_projects: 0,
        }),
    })
}
