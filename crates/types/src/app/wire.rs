// Path: crates/types/src/app/wire.rs
//! Request and response bodies of the gateway endpoints.
//!
//! Responses only name the fields the forge asserts on; anything else the
//! gateway returns (`network`, `timestamp`, `latency`, ...) is ignored.

use super::tokens::{AllowanceSnapshot, BalanceSheet};
use serde::{Deserialize, Serialize};

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `"ok"` when the gateway is healthy.
    pub status: String,
}

/// Body of `POST /eth/balances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesRequest {
    /// Symbols to report balances for.
    pub token_symbols: Vec<String>,
}

/// Response of `POST /eth/balances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancesResponse {
    /// Balance per symbol.
    pub balances: BalanceSheet,
}

/// Body of `POST /eth/allowances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowancesRequest {
    /// Symbols to report allowances for.
    pub token_symbols: Vec<String>,
    /// The address the allowances were granted to.
    pub spender: String,
}

/// Response of `POST /eth/allowances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowancesResponse {
    /// Allowance per symbol.
    pub approvals: AllowanceSnapshot,
}

/// Response of `POST /eth/nonce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceResponse {
    /// Next nonce for the wallet.
    pub nonce: u64,
}

/// Body of `POST /eth/approve`.
///
/// Every field but `token` is optional so that deliberately incomplete
/// requests can be sent when probing the gateway's validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveRequest {
    /// Token symbol to approve.
    pub token: String,
    /// Address being granted the allowance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spender: Option<String>,
    /// Legacy name for the spender field. Only sent by the invalid-amount step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
    /// Decimal amount to approve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Nonce to sign the transaction with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

impl ApproveRequest {
    /// A request for `token` with nothing else set.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    /// Sets the spender.
    pub fn spender(mut self, spender: impl Into<String>) -> Self {
        self.spender = Some(spender.into());
        self
    }

    /// Sets the legacy `connector` field.
    pub fn connector(mut self, connector: impl Into<String>) -> Self {
        self.connector = Some(connector.into());
        self
    }

    /// Sets the amount.
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    /// Sets the nonce.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }
}

/// Response of a successful `POST /eth/approve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalOutcome {
    /// The amount the transaction approves.
    pub amount: String,
    /// The nonce the transaction was signed with.
    pub nonce: u64,
}
