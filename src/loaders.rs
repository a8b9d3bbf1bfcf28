//! Bulk source loading for a resolved project set.

use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use crate::store::{
    ChangeRequestRow, ProjectBudgetRow, ProjectKpiValueRow, RiskRow, RollupStore,
};

/// Raw rows fetched for one rollup invocation, one bulk query per source.
#[derive(Debug, Default)]
pub struct SourceRows {
    pub kpi_values: Vec<ProjectKpiValueRow>,
    pub budgets: Vec<ProjectBudgetRow>,
    pub change_requests: Vec<ChangeRequestRow>,
    pub open_risks: Vec<RiskRow>,
}

/// Fetch all four sources for the given projects.
///
/// The loaders are independent of one another, so all four queries fire
/// together and are awaited together. An empty project set short-circuits
/// to empty collections without touching the store at all.
pub async fn load_sources(
    store: &dyn RollupStore,
    project_ids: &[String],
    workspace_id: &str,
    organization_id: &str,
    as_of_date: NaiveDate,
) -> Result<SourceRows> {
    if project_ids.is_empty() {
        debug!("No member projects; skipping source queries");
        return Ok(SourceRows::default());
    }

    let (kpi_values, budgets, change_requests, open_risks) = tokio::join!(
        store.list_kpi_values(project_ids, workspace_id, as_of_date),
        store.list_budgets(project_ids),
        store.list_change_requests(project_ids),
        store.list_open_risks(project_ids, organization_id),
    );

    let rows = SourceRows {
        kpi_values: kpi_values?,
        budgets: budgets?,
        change_requests: change_requests?,
        open_risks: open_risks?,
    };
    debug!(
        kpi_values = rows.kpi_values.len(),
        budgets = rows.budgets.len(),
        change_requests = rows.change_requests.len(),
        open_risks = rows.open_risks.len(),
        "Loaded source rows"
    );
    Ok(rows)
}
