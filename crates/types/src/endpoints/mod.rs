// Path: crates/types/src/endpoints/mod.rs
//! Paths of the gateway endpoints exercised by the forge.

/// Health check. Answers `{ "status": "ok" }`.
pub const STATUS: &str = "/";
/// Balances for a list of token symbols, plus the native asset.
pub const BALANCES: &str = "/eth/balances";
/// Allowances granted to a spender for a list of token symbols.
pub const ALLOWANCES: &str = "/eth/allowances";
/// Next transaction nonce for the wallet behind the private key.
pub const NONCE: &str = "/eth/nonce";
/// Submits an ERC-20 `approve` transaction.
pub const APPROVE: &str = "/eth/approve";

/// Symbol under which the gateway reports the native-asset balance.
pub const NATIVE_ASSET_SYMBOL: &str = "ETH";
