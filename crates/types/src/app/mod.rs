// Path: crates/types/src/app/mod.rs
//! Application-level data structures shared between the client and the forge.

mod credential;
mod scenario;
mod tokens;
mod wire;

pub use credential::{Credential, PRIVATE_KEY_ENV};
pub use scenario::ScenarioStep;
pub use tokens::{AllowanceSnapshot, BalanceSheet, TokenSymbolSet, TOKEN_SET_SIZE};
pub use wire::{
    AllowancesRequest, AllowancesResponse, ApprovalOutcome, ApproveRequest, BalancesRequest,
    BalancesResponse, NonceResponse, StatusResponse,
};
