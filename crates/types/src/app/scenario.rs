// Path: crates/types/src/app/scenario.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// The steps of the approval scenario, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStep {
    /// `GET /` must report `status == "ok"`.
    Status,
    /// Balances for the configured tokens; the native balance must be positive.
    Balances,
    /// Balances for unknown symbols must fail.
    InvalidBalances,
    /// Allowances for the configured tokens are recorded.
    Allowances,
    /// Approvals for the first two tokens are submitted and confirmed.
    ApprovalConfirmation,
    /// Approval against a malformed spender must fail.
    InvalidSpender,
    /// Approval of an unknown token must fail.
    InvalidToken,
    /// Approval of a non-numeric amount must fail.
    InvalidAmount,
}

impl ScenarioStep {
    /// Every step, in the order the orchestrator runs them.
    pub const ALL: [ScenarioStep; 8] = [
        ScenarioStep::Status,
        ScenarioStep::Balances,
        ScenarioStep::InvalidBalances,
        ScenarioStep::Allowances,
        ScenarioStep::ApprovalConfirmation,
        ScenarioStep::InvalidSpender,
        ScenarioStep::InvalidToken,
        ScenarioStep::InvalidAmount,
    ];

    /// Stable snake_case name used in logs and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioStep::Status => "status",
            ScenarioStep::Balances => "balances",
            ScenarioStep::InvalidBalances => "invalid_balances",
            ScenarioStep::Allowances => "allowances",
            ScenarioStep::ApprovalConfirmation => "approval_confirmation",
            ScenarioStep::InvalidSpender => "invalid_spender",
            ScenarioStep::InvalidToken => "invalid_token",
            ScenarioStep::InvalidAmount => "invalid_amount",
        }
    }
}

impl fmt::Display for ScenarioStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
