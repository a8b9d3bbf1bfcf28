//! The rollup engine: one orchestration, two scope-typed entry points.
//!
//! Flow per invocation: resolve the scope record, resolve member projects,
//! fire the four source loaders concurrently, resolve governance flags,
//! evaluate the KPI catalog with gating, then assemble the deterministic
//! result. Nothing is cached between invocations and nothing is written.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::assembler;
use crate::context::RollupContext;
use crate::error::RollupError;
use crate::governance::GovernanceFlags;
use crate::loaders;
use crate::registry::{self, KpiDefinition, ENGINE_VERSION};
use crate::result::{
    KpiDetail, KpiStatus, KpiValueJson, RollupKpi, RollupResult, ScopeKind, SkipReason, SkippedKpi,
};
use crate::scope;
use crate::store::RollupStore;

/// Aggregates project-level metrics into scope-level KPIs.
///
/// The engine holds nothing but the store handle; every invocation builds
/// its own [`RollupContext`] and the same instance is safe to share across
/// concurrent requests.
pub struct RollupEngine {
    store: Arc<dyn RollupStore>,
}

impl RollupEngine {
    pub fn new(store: Arc<dyn RollupStore>) -> Self {
        Self { store }
    }

    /// Roll up a portfolio's member projects as of the given snapshot date
    /// (today, UTC, when `None`).
    ///
    /// Fails only when the portfolio is missing from the caller's tenancy or
    /// the storage layer errors; per-KPI failures are absorbed into the
    /// result as `NO_DATA` entries.
    pub async fn compute_for_portfolio(
        &self,
        workspace_id: &str,
        portfolio_id: &str,
        organization_id: &str,
        as_of_date: Option<NaiveDate>,
    ) -> Result<RollupResult, RollupError> {
        let as_of = as_of_date.unwrap_or_else(today_utc);

        let portfolio = self
            .store
            .get_portfolio(workspace_id, portfolio_id, organization_id)
            .await?
            .ok_or_else(|| RollupError::ScopeNotFound {
                scope: ScopeKind::Portfolio,
                id: portfolio_id.to_string(),
            })?;

        let project_ids = scope::resolve_portfolio_projects(
            self.store.as_ref(),
            portfolio_id,
            organization_id,
            workspace_id,
        )
        .await?;
        let sources = loaders::load_sources(
            self.store.as_ref(),
            &project_ids,
            workspace_id,
            organization_id,
            as_of,
        )
        .await?;

        let flags = GovernanceFlags::from_portfolio(&portfolio);
        let context = RollupContext::new(
            project_ids,
            sources.kpi_values,
            sources.budgets,
            sources.change_requests,
            sources.open_risks,
        );

        let (computed, skipped) =
            run_registry(registry::registry(), &context, &flags, ScopeKind::Portfolio);
        let result = assembler::assemble(
            portfolio_id.to_string(),
            None,
            as_of,
            computed,
            skipped,
            &context,
        );

        info!(
            scope = %ScopeKind::Portfolio,
            scope_id = portfolio_id,
            project_count = result.sources.project_count,
            computed = result.computed.len(),
            skipped = result.skipped.len(),
            input_hash = %result.input_hash,
            "Rollup complete"
        );
        Ok(result)
    }

    /// Roll up a program's member projects as of the given snapshot date
    /// (today, UTC, when `None`). Governance flags are inherited from the
    /// program's parent portfolio when it has one.
    pub async fn compute_for_program(
        &self,
        workspace_id: &str,
        program_id: &str,
        organization_id: &str,
        as_of_date: Option<NaiveDate>,
    ) -> Result<RollupResult, RollupError> {
        let as_of = as_of_date.unwrap_or_else(today_utc);

        let program = self
            .store
            .get_program(program_id, organization_id)
            .await?
            .ok_or_else(|| RollupError::ScopeNotFound {
                scope: ScopeKind::Program,
                id: program_id.to_string(),
            })?;

        let project_ids = scope::resolve_program_projects(
            self.store.as_ref(),
            program_id,
            organization_id,
            workspace_id,
        )
        .await?;
        let sources = loaders::load_sources(
            self.store.as_ref(),
            &project_ids,
            workspace_id,
            organization_id,
            as_of,
        )
        .await?;

        // One parent lookup at most; a missing or unset parent falls back to
        // all-false flags rather than failing the rollup.
        let parent = match program.portfolio_id.as_deref() {
            Some(parent_id) => {
                self.store
                    .get_parent_portfolio(parent_id, organization_id)
                    .await?
            }
            None => None,
        };
        let flags = GovernanceFlags::inherit_from(parent.as_ref());

        let context = RollupContext::new(
            project_ids,
            sources.kpi_values,
            sources.budgets,
            sources.change_requests,
            sources.open_risks,
        );

        let (computed, skipped) =
            run_registry(registry::registry(), &context, &flags, ScopeKind::Program);
        let result = assembler::assemble(
            program_id.to_string(),
            program.portfolio_id.clone(),
            as_of,
            computed,
            skipped,
            &context,
        );

        info!(
            scope = %ScopeKind::Program,
            scope_id = program_id,
            project_count = result.sources.project_count,
            computed = result.computed.len(),
            skipped = result.skipped.len(),
            input_hash = %result.input_hash,
            "Rollup complete"
        );
        Ok(result)
    }
}

/// Evaluate every definition in catalog order: gate on governance, run the
/// computation, and downgrade failures. A failing compute never aborts the
/// batch.
fn run_registry(
    definitions: &[KpiDefinition],
    context: &RollupContext,
    flags: &GovernanceFlags,
    scope: ScopeKind,
) -> (Vec<RollupKpi>, Vec<SkippedKpi>) {
    let mut computed = Vec::with_capacity(definitions.len());
    let mut skipped = Vec::new();

    for definition in definitions {
        if let Some(flag) = definition.required_governance_flag {
            if !flags.is_enabled(flag) {
                skipped.push(SkippedKpi {
                    kpi_code: definition.code.to_string(),
                    kpi_name: definition.name.to_string(),
                    reason: SkipReason::GovernanceFlagDisabled,
                    governance_flag: flag,
                });
                continue;
            }
        }

        let kpi = match (definition.compute)(context) {
            Ok(computation) => RollupKpi {
                kpi_code: definition.code.to_string(),
                kpi_name: definition.name.to_string(),
                value: computation.value,
                unit: definition.unit,
                status: computation.status,
                value_json: KpiValueJson {
                    engine_version: ENGINE_VERSION.to_string(),
                    scope,
                    detail: computation.detail,
                },
            },
            Err(error) => {
                warn!(kpi_code = definition.code, %error, "KPI computation failed; downgrading to NO_DATA");
                RollupKpi {
                    kpi_code: definition.code.to_string(),
                    kpi_name: definition.name.to_string(),
                    value: None,
                    unit: definition.unit,
                    status: KpiStatus::NoData,
                    value_json: KpiValueJson {
                        engine_version: ENGINE_VERSION.to_string(),
                        scope,
                        detail: KpiDetail::Error {
                            error: "COMPUTE_ERROR".to_string(),
                        },
                    },
                }
            }
        };
        computed.push(kpi);
    }

    (computed, skipped)
}

fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}
