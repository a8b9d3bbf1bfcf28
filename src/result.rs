//! Output types for a rollup invocation.
//!
//! Everything in this module serializes onto the platform's camelCase JSON
//! contract. [`RollupResult`] is the engine's single return value; persisting
//! or transporting it is the caller's concern.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::governance::GovernanceFlag;
use crate::registry::KpiUnit;

// =============================================================================
// SCOPE AND STATUS ENUMS
// =============================================================================

/// Scope discriminator stamped into every computed KPI payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeKind {
    Portfolio,
    Program,
}

impl ScopeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portfolio => "PORTFOLIO",
            Self::Program => "PROGRAM",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health status attached to a computed KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KpiStatus {
    Ok,
    Warning,
    Breach,
    NoData,
}

impl KpiStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Breach => "BREACH",
            Self::NoData => "NO_DATA",
        }
    }
}

// =============================================================================
// PER-KPI DETAIL PAYLOADS
// =============================================================================

/// Closed detail payload carried inside [`KpiValueJson`], tagged by `basis`.
///
/// Each variant names the inputs one KPI family actually used, so consumers
/// can render provenance without guessing at loose keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum KpiDetail {
    /// Mean over each contributing project's latest value.
    #[serde(rename_all = "camelCase")]
    LatestAverage { contributing_projects: usize },
    /// Sum over each contributing project's latest value.
    #[serde(rename_all = "camelCase")]
    LatestSum { contributing_projects: usize },
    /// Budget-burn numerator and denominator totals.
    #[serde(rename_all = "camelCase")]
    BudgetBurn { baseline_total: f64, revised_total: f64 },
    /// Forecast-at-completion sum across budget rows.
    #[serde(rename_all = "camelCase")]
    ForecastTotal { budget_rows: usize },
    /// Open-risk tally.
    #[serde(rename_all = "camelCase")]
    RiskCount { open_risks: usize },
    /// Decided change-request split behind the approval rate.
    #[serde(rename_all = "camelCase")]
    ApprovalRate {
        approved: usize,
        rejected: usize,
        undecided: usize,
    },
    /// The compute function failed; the batch carried on without it.
    #[serde(rename_all = "camelCase")]
    Error { error: String },
}

/// The `valueJson` payload attached to every computed KPI: the detail fields
/// plus the engine version and scope stamp, flattened into one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiValueJson {
    pub engine_version: String,
    pub scope: ScopeKind,
    #[serde(flatten)]
    pub detail: KpiDetail,
}

// =============================================================================
// COMPUTED / SKIPPED ENTRIES
// =============================================================================

/// One KPI the engine computed (including `NO_DATA` outcomes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupKpi {
    pub kpi_code: String,
    pub kpi_name: String,
    /// `None` exactly when `status` is [`KpiStatus::NoData`].
    pub value: Option<f64>,
    pub unit: KpiUnit,
    pub status: KpiStatus,
    pub value_json: KpiValueJson,
}

/// Why a KPI was skipped rather than computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    /// The governance flag the KPI requires is disabled for this scope.
    GovernanceFlagDisabled,
}

/// One KPI the engine skipped, with the flag that gated it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedKpi {
    pub kpi_code: String,
    pub kpi_name: String,
    pub reason: SkipReason,
    pub governance_flag: GovernanceFlag,
}

// =============================================================================
// RESULT ENVELOPE
// =============================================================================

/// Row counts describing what the loaders actually found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCounts {
    /// Resolved member projects, post dedup.
    pub project_count: usize,
    /// Distinct projects that contributed at least one KPI measurement.
    pub projects_with_kpis: usize,
    /// Budget rows found across the project set.
    pub budgets_found: usize,
}

/// The engine's complete answer for one scope at one snapshot date.
///
/// `computed` and `skipped` are both ordered by ascending `kpiCode` (ordinal
/// string compare), and `inputHash` fingerprints the id sets that fed the
/// computation, so two results are comparable field-for-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupResult {
    /// Portfolio id or program id, per the entry point used.
    pub scope_id: String,
    /// Parent portfolio reference, populated for program scope only.
    pub portfolio_id: Option<String>,
    pub as_of_date: NaiveDate,
    pub engine_version: String,
    /// 16 lowercase hex characters over the canonical input-id payload.
    pub input_hash: String,
    pub computed: Vec<RollupKpi>,
    pub skipped: Vec<SkippedKpi>,
    pub sources: SourceCounts,
}
