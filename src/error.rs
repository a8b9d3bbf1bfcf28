//! Error types for the rollup engine boundary.

use thiserror::Error;

use crate::result::ScopeKind;

/// Failures that can escape the engine's entry points.
///
/// Per-KPI computation failures never appear here: the run loop catches them
/// and downgrades the affected KPI to a `NO_DATA` entry so one bad
/// computation cannot sink the batch.
#[derive(Error, Debug)]
pub enum RollupError {
    /// The requested scope does not exist within the caller's organization
    /// and workspace. Deliberately indistinguishable from a cross-tenant id.
    #[error("{scope} {id} not found for the given organization and workspace")]
    ScopeNotFound { scope: ScopeKind, id: String },

    /// The storage layer failed while resolving scope or loading source rows.
    #[error("Storage error: {0}")]
    Store(#[from] anyhow::Error),
}
