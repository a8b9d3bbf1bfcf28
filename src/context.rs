//! Per-invocation data snapshot handed to every KPI computation.

use std::collections::BTreeMap;

use crate::store::{ChangeRequestRow, ProjectBudgetRow, ProjectKpiValueRow, RiskRow};

/// Everything a KPI computation may read, assembled once per rollup and
/// never mutated afterwards. Computations see identical inputs regardless
/// of evaluation order.
#[derive(Debug, Clone)]
pub struct RollupContext {
    /// project id -> (kpi code -> latest measurement), post latest-wins
    /// selection. BTreeMaps keep iteration order deterministic, so float
    /// accumulation never depends on storage return order.
    latest_kpi_values: BTreeMap<String, BTreeMap<String, ProjectKpiValueRow>>,
    /// Member project ids, deduplicated and sorted by the scope resolver.
    pub project_ids: Vec<String>,
    pub budgets: Vec<ProjectBudgetRow>,
    pub change_requests: Vec<ChangeRequestRow>,
    pub open_risks: Vec<RiskRow>,
}

impl RollupContext {
    /// Build the context from loader output, reducing raw KPI history to the
    /// latest row per project per KPI code.
    pub fn new(
        project_ids: Vec<String>,
        kpi_values: Vec<ProjectKpiValueRow>,
        budgets: Vec<ProjectBudgetRow>,
        change_requests: Vec<ChangeRequestRow>,
        open_risks: Vec<RiskRow>,
    ) -> Self {
        Self {
            latest_kpi_values: select_latest_per_project(kpi_values),
            project_ids,
            budgets,
            change_requests,
            open_risks,
        }
    }

    /// Each contributing project's latest value for the given KPI code, in
    /// project-id order. Projects without a measurement for the code are
    /// absent, not zero.
    pub fn latest_values_for(&self, kpi_code: &str) -> Vec<f64> {
        self.latest_kpi_values
            .values()
            .filter_map(|per_code| per_code.get(kpi_code).map(|row| row.value))
            .collect()
    }

    /// Distinct projects that contributed at least one KPI measurement.
    pub fn projects_with_kpis(&self) -> usize {
        self.latest_kpi_values.len()
    }

    /// Row ids of every measurement retained by latest-wins selection.
    /// These are the KPI-value ids the input hash covers.
    pub fn kpi_value_row_ids(&self) -> Vec<String> {
        self.latest_kpi_values
            .values()
            .flat_map(|per_code| per_code.values().map(|row| row.id.clone()))
            .collect()
    }
}

/// Group rows by project, order each group by `as_of_date` descending (id
/// ascending as the tiebreak), and keep the first row seen per KPI code.
/// The explicit sort makes selection independent of query return order.
fn select_latest_per_project(
    rows: Vec<ProjectKpiValueRow>,
) -> BTreeMap<String, BTreeMap<String, ProjectKpiValueRow>> {
    let mut by_project: BTreeMap<String, Vec<ProjectKpiValueRow>> = BTreeMap::new();
    for row in rows {
        by_project.entry(row.project_id.clone()).or_default().push(row);
    }

    let mut latest = BTreeMap::new();
    for (project_id, mut project_rows) in by_project {
        project_rows.sort_by(|a, b| b.as_of_date.cmp(&a.as_of_date).then_with(|| a.id.cmp(&b.id)));
        let mut per_code: BTreeMap<String, ProjectKpiValueRow> = BTreeMap::new();
        for row in project_rows {
            per_code.entry(row.kpi_code.clone()).or_insert(row);
        }
        latest.insert(project_id, per_code);
    }
    latest
}
