//! Shared integration-test fixtures: an in-memory store with per-method
//! call counters, plus row builders.
//!
//! Lives under `helpers/` so the test runner does not pick it up as its own
//! test binary; include it with `#[path = "helpers/rollup_fixtures.rs"]`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use kpi_rollup::{
    ChangeRequestRow, PortfolioRow, ProgramRow, ProjectBudgetRow, ProjectKpiValueRow, RiskRow,
    RollupStore,
};

pub const ORG: &str = "org-1";
pub const WS: &str = "ws-1";

/// Just enough of a project record to answer membership queries.
#[derive(Debug, Clone)]
pub struct FakeProject {
    pub id: String,
    pub organization_id: String,
    pub workspace_id: String,
    pub portfolio_id: Option<String>,
    pub program_id: Option<String>,
}

/// In-memory [`RollupStore`] over plain vectors.
///
/// Every trait method bumps its counter before answering, so tests can
/// assert the engine's bounded-call guarantee. Row vectors are returned in
/// stored order, which lets order-independence tests permute them freely.
#[derive(Debug, Default)]
pub struct FakeStore {
    pub portfolios: Vec<PortfolioRow>,
    pub programs: Vec<ProgramRow>,
    pub projects: Vec<FakeProject>,
    /// (portfolio_id, project_id) rows of the portfolio-project link table.
    pub portfolio_links: Vec<(String, String)>,
    pub kpi_values: Vec<ProjectKpiValueRow>,
    pub budgets: Vec<ProjectBudgetRow>,
    pub change_requests: Vec<ChangeRequestRow>,
    pub risks: Vec<RiskRow>,

    pub get_portfolio_calls: AtomicU64,
    pub get_program_calls: AtomicU64,
    pub get_parent_portfolio_calls: AtomicU64,
    pub list_projects_calls: AtomicU64,
    pub list_kpi_values_calls: AtomicU64,
    pub list_budgets_calls: AtomicU64,
    pub list_change_requests_calls: AtomicU64,
    pub list_open_risks_calls: AtomicU64,
}

impl FakeStore {
    pub fn loader_calls(&self) -> [u64; 4] {
        [
            self.list_kpi_values_calls.load(Ordering::SeqCst),
            self.list_budgets_calls.load(Ordering::SeqCst),
            self.list_change_requests_calls.load(Ordering::SeqCst),
            self.list_open_risks_calls.load(Ordering::SeqCst),
        ]
    }
}

#[async_trait]
impl RollupStore for FakeStore {
    async fn get_portfolio(
        &self,
        workspace_id: &str,
        portfolio_id: &str,
        organization_id: &str,
    ) -> Result<Option<PortfolioRow>> {
        self.get_portfolio_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .portfolios
            .iter()
            .find(|p| {
                p.id == portfolio_id
                    && p.organization_id == organization_id
                    && p.workspace_id == workspace_id
            })
            .cloned())
    }

    async fn get_program(
        &self,
        program_id: &str,
        organization_id: &str,
    ) -> Result<Option<ProgramRow>> {
        self.get_program_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .programs
            .iter()
            .find(|p| p.id == program_id && p.organization_id == organization_id)
            .cloned())
    }

    async fn get_parent_portfolio(
        &self,
        portfolio_id: &str,
        organization_id: &str,
    ) -> Result<Option<PortfolioRow>> {
        self.get_parent_portfolio_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .portfolios
            .iter()
            .find(|p| p.id == portfolio_id && p.organization_id == organization_id)
            .cloned())
    }

    async fn list_project_ids_for_portfolio(
        &self,
        portfolio_id: &str,
        organization_id: &str,
        workspace_id: &str,
    ) -> Result<Vec<String>> {
        self.list_projects_calls.fetch_add(1, Ordering::SeqCst);
        let mut ids: Vec<String> = self
            .projects
            .iter()
            .filter(|p| {
                p.portfolio_id.as_deref() == Some(portfolio_id)
                    && p.organization_id == organization_id
                    && p.workspace_id == workspace_id
            })
            .map(|p| p.id.clone())
            .collect();
        // Link-table members; duplicates with the direct path are expected
        // and left in place, since dedup is the resolver's job.
        for (linked_portfolio, linked_project) in &self.portfolio_links {
            if linked_portfolio != portfolio_id {
                continue;
            }
            if let Some(project) = self.projects.iter().find(|p| &p.id == linked_project) {
                if project.workspace_id == workspace_id {
                    ids.push(project.id.clone());
                }
            }
        }
        Ok(ids)
    }

    async fn list_project_ids_for_program(
        &self,
        program_id: &str,
        organization_id: &str,
        workspace_id: &str,
    ) -> Result<Vec<String>> {
        self.list_projects_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .projects
            .iter()
            .filter(|p| {
                p.program_id.as_deref() == Some(program_id)
                    && p.organization_id == organization_id
                    && p.workspace_id == workspace_id
            })
            .map(|p| p.id.clone())
            .collect())
    }

    async fn list_kpi_values(
        &self,
        project_ids: &[String],
        _workspace_id: &str,
        as_of_date: NaiveDate,
    ) -> Result<Vec<ProjectKpiValueRow>> {
        self.list_kpi_values_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .kpi_values
            .iter()
            .filter(|v| project_ids.contains(&v.project_id) && v.as_of_date <= as_of_date)
            .cloned()
            .collect())
    }

    async fn list_budgets(&self, project_ids: &[String]) -> Result<Vec<ProjectBudgetRow>> {
        self.list_budgets_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .budgets
            .iter()
            .filter(|b| project_ids.contains(&b.project_id))
            .cloned()
            .collect())
    }

    async fn list_change_requests(
        &self,
        project_ids: &[String],
    ) -> Result<Vec<ChangeRequestRow>> {
        self.list_change_requests_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .change_requests
            .iter()
            .filter(|cr| project_ids.contains(&cr.project_id))
            .cloned()
            .collect())
    }

    async fn list_open_risks(
        &self,
        project_ids: &[String],
        _organization_id: &str,
    ) -> Result<Vec<RiskRow>> {
        self.list_open_risks_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .risks
            .iter()
            .filter(|r| project_ids.contains(&r.project_id) && r.status == "open")
            .cloned()
            .collect())
    }
}

// =============================================================================
// ROW BUILDERS
// =============================================================================

/// Portfolio in the default tenancy with every governance flag enabled.
pub fn portfolio(id: &str) -> PortfolioRow {
    PortfolioRow {
        id: id.to_string(),
        organization_id: ORG.to_string(),
        workspace_id: WS.to_string(),
        cost_tracking_enabled: true,
        baselines_enabled: true,
        iterations_enabled: true,
        change_management_enabled: true,
    }
}

pub fn program(id: &str, parent_portfolio: Option<&str>) -> ProgramRow {
    ProgramRow {
        id: id.to_string(),
        organization_id: ORG.to_string(),
        portfolio_id: parent_portfolio.map(|p| p.to_string()),
    }
}

/// Project in the default tenancy, not yet attached to any scope.
pub fn project(id: &str) -> FakeProject {
    FakeProject {
        id: id.to_string(),
        organization_id: ORG.to_string(),
        workspace_id: WS.to_string(),
        portfolio_id: None,
        program_id: None,
    }
}

pub fn project_in_portfolio(id: &str, portfolio_id: &str) -> FakeProject {
    FakeProject {
        portfolio_id: Some(portfolio_id.to_string()),
        ..project(id)
    }
}

pub fn project_in_program(id: &str, program_id: &str) -> FakeProject {
    FakeProject {
        program_id: Some(program_id.to_string()),
        ..project(id)
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn kpi_value(id: &str, project: &str, code: &str, value: f64, as_of: NaiveDate) -> ProjectKpiValueRow {
    ProjectKpiValueRow {
        id: id.to_string(),
        project_id: project.to_string(),
        kpi_code: code.to_string(),
        value,
        as_of_date: as_of,
    }
}

pub fn budget(id: &str, project: &str, baseline: i64, revised: i64, forecast: i64) -> ProjectBudgetRow {
    ProjectBudgetRow {
        id: id.to_string(),
        project_id: project.to_string(),
        baseline_budget: Decimal::from(baseline),
        revised_budget: Decimal::from(revised),
        forecast_at_completion: Decimal::from(forecast),
    }
}

pub fn change_request(id: &str, project: &str, status: &str) -> ChangeRequestRow {
    ChangeRequestRow {
        id: id.to_string(),
        project_id: project.to_string(),
        status: status.to_string(),
    }
}

pub fn risk(id: &str, project: &str, status: &str) -> RiskRow {
    RiskRow {
        id: id.to_string(),
        project_id: project.to_string(),
        status: status.to_string(),
    }
}

/// Initialize test logging once per binary; respects `RUST_LOG`.
pub fn init_tracing() {
    use std::sync::Once;
    static TRACING: Once = Once::new();
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
