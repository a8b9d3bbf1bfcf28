//! Read-only data access seam for the rollup engine.
//!
//! The engine talks to storage exclusively through [`RollupStore`]. Row
//! structs here are projections of the platform schema, carrying only the
//! columns a rollup actually reads. The Postgres implementation lives in
//! [`postgres`] behind the `database` feature; tests substitute an in-memory
//! fake.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[cfg(feature = "database")]
mod postgres;
#[cfg(feature = "database")]
pub use postgres::{mask_database_url, PgRollupStore, StoreConfig};

// =============================================================================
// ROW PROJECTIONS
// =============================================================================

/// Portfolio record with its methodology governance toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct PortfolioRow {
    pub id: String,
    pub organization_id: String,
    pub workspace_id: String,
    pub cost_tracking_enabled: bool,
    pub baselines_enabled: bool,
    pub iterations_enabled: bool,
    pub change_management_enabled: bool,
}

/// Program record. `portfolio_id` is the optional parent link governance
/// inheritance follows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct ProgramRow {
    pub id: String,
    pub organization_id: String,
    pub portfolio_id: Option<String>,
}

/// One dated KPI measurement for one project, already joined to its KPI-code
/// dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct ProjectKpiValueRow {
    pub id: String,
    pub project_id: String,
    pub kpi_code: String,
    pub value: f64,
    pub as_of_date: NaiveDate,
}

/// Budget figures for one project. Money stays `Decimal` until a computation
/// needs a float.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct ProjectBudgetRow {
    pub id: String,
    pub project_id: String,
    pub baseline_budget: Decimal,
    pub revised_budget: Decimal,
    pub forecast_at_completion: Decimal,
}

/// Change request in any decision state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct ChangeRequestRow {
    pub id: String,
    pub project_id: String,
    pub status: String,
}

/// Risk register entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct RiskRow {
    pub id: String,
    pub project_id: String,
    pub status: String,
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Read contracts the rollup engine consumes from platform storage.
///
/// Implementations must answer each call with exactly one bulk query; the
/// engine's bounded-call guarantee (a fixed number of storage round trips
/// per rollup, independent of project count) rests on that. Implementations
/// never write.
#[async_trait]
pub trait RollupStore: Send + Sync {
    /// Portfolio lookup, tenancy-checked against organization and workspace.
    async fn get_portfolio(
        &self,
        workspace_id: &str,
        portfolio_id: &str,
        organization_id: &str,
    ) -> Result<Option<PortfolioRow>>;

    /// Program lookup, tenancy-checked against organization.
    async fn get_program(
        &self,
        program_id: &str,
        organization_id: &str,
    ) -> Result<Option<ProgramRow>>;

    /// Parent-portfolio lookup backing program governance inheritance.
    async fn get_parent_portfolio(
        &self,
        portfolio_id: &str,
        organization_id: &str,
    ) -> Result<Option<PortfolioRow>>;

    /// Member projects of a portfolio: direct scope foreign key unioned with
    /// the portfolio-project link table. May contain duplicates; callers
    /// dedup and sort.
    async fn list_project_ids_for_portfolio(
        &self,
        portfolio_id: &str,
        organization_id: &str,
        workspace_id: &str,
    ) -> Result<Vec<String>>;

    /// Member projects of a program (direct foreign key only).
    async fn list_project_ids_for_program(
        &self,
        program_id: &str,
        organization_id: &str,
        workspace_id: &str,
    ) -> Result<Vec<String>>;

    /// All KPI measurements for the given projects dated on or before the
    /// snapshot date. Full history within the window, not just the latest;
    /// latest-per-code selection happens in the engine.
    async fn list_kpi_values(
        &self,
        project_ids: &[String],
        workspace_id: &str,
        as_of_date: NaiveDate,
    ) -> Result<Vec<ProjectKpiValueRow>>;

    /// Budget rows for the given projects.
    async fn list_budgets(&self, project_ids: &[String]) -> Result<Vec<ProjectBudgetRow>>;

    /// Change requests for the given projects, any status.
    async fn list_change_requests(
        &self,
        project_ids: &[String],
    ) -> Result<Vec<ChangeRequestRow>>;

    /// Risks for the given projects currently in the open state.
    async fn list_open_risks(
        &self,
        project_ids: &[String],
        organization_id: &str,
    ) -> Result<Vec<RiskRow>>;
}
