//! Deterministic result assembly and input hashing.
//!
//! The assembler owns two guarantees: `computed`/`skipped` come back sorted
//! by KPI code, and `inputHash` is a pure function of the id sets that fed
//! the computation. Callers use the hash as a change/no-change signal, so
//! it must never vary with database row-return order.

use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::context::RollupContext;
use crate::registry::ENGINE_VERSION;
use crate::result::{RollupKpi, RollupResult, SkippedKpi, SourceCounts};

/// Canonical hash payload. Field order is fixed by this struct and every id
/// list is sorted before serialization; together that makes the digest
/// stable across invocations and platforms.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputHashPayload<'a> {
    scope_id: &'a str,
    as_of_date: NaiveDate,
    project_ids: &'a [String],
    budget_ids: &'a [String],
    kpi_value_ids: &'a [String],
}

/// 16-lowercase-hex-character fingerprint of everything that fed one rollup:
/// the scope, the snapshot date, and the sorted id sets of member projects,
/// budget rows, and retained KPI-value rows.
pub fn compute_input_hash(
    scope_id: &str,
    as_of_date: NaiveDate,
    mut project_ids: Vec<String>,
    mut budget_ids: Vec<String>,
    mut kpi_value_ids: Vec<String>,
) -> String {
    project_ids.sort_unstable();
    budget_ids.sort_unstable();
    kpi_value_ids.sort_unstable();

    let payload = InputHashPayload {
        scope_id,
        as_of_date,
        project_ids: &project_ids,
        budget_ids: &budget_ids,
        kpi_value_ids: &kpi_value_ids,
    };
    let bytes = serde_json::to_vec(&payload)
        .expect("hash payload contains only strings, lists, and a date; serialization is infallible");

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

/// Package computed and skipped KPIs into the final result, applying the
/// output ordering guarantee (ascending `kpiCode`, ordinal compare).
pub fn assemble(
    scope_id: String,
    portfolio_id: Option<String>,
    as_of_date: NaiveDate,
    mut computed: Vec<RollupKpi>,
    mut skipped: Vec<SkippedKpi>,
    context: &RollupContext,
) -> RollupResult {
    computed.sort_by(|a, b| a.kpi_code.cmp(&b.kpi_code));
    skipped.sort_by(|a, b| a.kpi_code.cmp(&b.kpi_code));

    let input_hash = compute_input_hash(
        &scope_id,
        as_of_date,
        context.project_ids.clone(),
        context.budgets.iter().map(|b| b.id.clone()).collect(),
        context.kpi_value_row_ids(),
    );

    let sources = SourceCounts {
        project_count: context.project_ids.len(),
        projects_with_kpis: context.projects_with_kpis(),
        budgets_found: context.budgets.len(),
    };

    RollupResult {
        scope_id,
        portfolio_id,
        as_of_date,
        engine_version: ENGINE_VERSION.to_string(),
        input_hash,
        computed,
        skipped,
        sources,
    }
}
