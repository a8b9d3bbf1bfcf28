//! Hierarchical KPI rollup engine for portfolio and program scopes.
//!
//! Aggregates project-level metrics into scope-level KPIs for a multi-tenant
//! project-management platform. Rollups are gated by governance flags, and
//! output is deterministic, versioned, and content-hashed so callers can use
//! it as a change/no-change signal.
//!
//! ## Architecture
//! One invocation flows through: scope lookup -> member-project resolution ->
//! four concurrent bulk loaders -> governance resolution -> KPI catalog
//! evaluation -> deterministic assembly. The engine is a pure read/compute
//! path; persisting the result is the caller's decision.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kpi_rollup::{RollupEngine, RollupStore};
//!
//! async fn portfolio_health(store: Arc<dyn RollupStore>) -> anyhow::Result<()> {
//!     let engine = RollupEngine::new(store);
//!     let result = engine
//!         .compute_for_portfolio("ws-1", "pf-1", "org-1", None)
//!         .await?;
//!     println!(
//!         "{} computed, {} skipped, input hash {}",
//!         result.computed.len(),
//!         result.skipped.len(),
//!         result.input_hash
//!     );
//!     Ok(())
//! }
//! ```

// Core error handling
pub mod error;

// Output contract
pub mod result;

// Governance flags and resolution
pub mod governance;

// Static KPI catalog and built-in computations
pub mod registry;

// Per-invocation snapshot handed to computations
pub mod context;

// Storage seam (Postgres implementation behind the `database` feature)
pub mod store;

// Resolution, loading, assembly, orchestration
pub mod assembler;
pub mod engine;
pub mod loaders;
pub mod scope;

// Public re-exports for the common call path
pub use context::RollupContext;
pub use engine::RollupEngine;
pub use error::RollupError;
pub use governance::{GovernanceFlag, GovernanceFlags};
pub use registry::{registry, KpiComputation, KpiDefinition, KpiUnit, ENGINE_VERSION};
pub use result::{
    KpiDetail, KpiStatus, KpiValueJson, RollupKpi, RollupResult, ScopeKind, SkipReason,
    SkippedKpi, SourceCounts,
};
pub use store::{
    ChangeRequestRow, PortfolioRow, ProgramRow, ProjectBudgetRow, ProjectKpiValueRow, RiskRow,
    RollupStore,
};
#[cfg(feature = "database")]
pub use store::{PgRollupStore, StoreConfig};
