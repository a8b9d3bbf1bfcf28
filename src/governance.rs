//! Governance flags and their resolution per scope.
//!
//! Flags come off the owning portfolio's methodology configuration. A
//! portfolio carries its own flags; a program inherits its parent
//! portfolio's, and an orphaned program gets everything disabled, so gated
//! KPIs stay silent rather than leaking past a missing config.

use serde::{Deserialize, Serialize};

use crate::store::PortfolioRow;

/// The four governance toggles a scope's methodology configuration exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceFlags {
    pub cost_tracking_enabled: bool,
    pub baselines_enabled: bool,
    pub iterations_enabled: bool,
    pub change_management_enabled: bool,
}

impl GovernanceFlags {
    /// Portfolio scope reads flags directly off its own record.
    pub fn from_portfolio(portfolio: &PortfolioRow) -> Self {
        Self {
            cost_tracking_enabled: portfolio.cost_tracking_enabled,
            baselines_enabled: portfolio.baselines_enabled,
            iterations_enabled: portfolio.iterations_enabled,
            change_management_enabled: portfolio.change_management_enabled,
        }
    }

    /// Program scope inherits from its parent portfolio when one resolved.
    /// No parent means all flags read false.
    pub fn inherit_from(parent: Option<&PortfolioRow>) -> Self {
        match parent {
            Some(portfolio) => Self::from_portfolio(portfolio),
            None => Self::default(),
        }
    }

    pub fn is_enabled(&self, flag: GovernanceFlag) -> bool {
        match flag {
            GovernanceFlag::CostTracking => self.cost_tracking_enabled,
            GovernanceFlag::Baselines => self.baselines_enabled,
            GovernanceFlag::Iterations => self.iterations_enabled,
            GovernanceFlag::ChangeManagement => self.change_management_enabled,
        }
    }
}

/// Identifies a single governance flag. Serialized with the platform's
/// camelCase flag names so skip entries read the same as the config itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceFlag {
    #[serde(rename = "costTrackingEnabled")]
    CostTracking,
    #[serde(rename = "baselinesEnabled")]
    Baselines,
    #[serde(rename = "iterationsEnabled")]
    Iterations,
    #[serde(rename = "changeManagementEnabled")]
    ChangeManagement,
}

impl GovernanceFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CostTracking => "costTrackingEnabled",
            Self::Baselines => "baselinesEnabled",
            Self::Iterations => "iterationsEnabled",
            Self::ChangeManagement => "changeManagementEnabled",
        }
    }
}
