//! Member-project resolution per scope.

use anyhow::Result;

use crate::store::RollupStore;

/// Resolve a portfolio's member projects: direct foreign-key members plus
/// link-table members, deduplicated and sorted. An empty result is valid
/// (the scope exists but owns no projects).
pub async fn resolve_portfolio_projects(
    store: &dyn RollupStore,
    portfolio_id: &str,
    organization_id: &str,
    workspace_id: &str,
) -> Result<Vec<String>> {
    let ids = store
        .list_project_ids_for_portfolio(portfolio_id, organization_id, workspace_id)
        .await?;
    Ok(dedup_sorted(ids))
}

/// Resolve a program's member projects (direct foreign key only).
pub async fn resolve_program_projects(
    store: &dyn RollupStore,
    program_id: &str,
    organization_id: &str,
    workspace_id: &str,
) -> Result<Vec<String>> {
    let ids = store
        .list_project_ids_for_program(program_id, organization_id, workspace_id)
        .await?;
    Ok(dedup_sorted(ids))
}

/// Sort and deduplicate in code, so the resolved set never depends on how
/// the storage layer ordered its rows or whether the union produced repeats.
fn dedup_sorted(mut ids: Vec<String>) -> Vec<String> {
    ids.sort_unstable();
    ids.dedup();
    ids
}
