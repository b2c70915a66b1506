// Path: crates/types/src/app/tokens.rs

use crate::endpoints::NATIVE_ASSET_SYMBOL;
use crate::error::ScenarioError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of symbols a scenario run operates on.
pub const TOKEN_SET_SIZE: usize = 3;

/// An ordered set of exactly three token symbols.
///
/// The first two symbols are the ones whose allowances get reset during the
/// approval confirmation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenSymbolSet([String; TOKEN_SET_SIZE]);

impl TokenSymbolSet {
    /// All symbols, in configured order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// The symbols whose allowances are reset and confirmed.
    pub fn under_test(&self) -> [&str; 2] {
        let [first, second, _] = &self.0;
        [first.as_str(), second.as_str()]
    }

    /// The first configured symbol, used as the valid token in negative approvals.
    pub fn primary(&self) -> &str {
        let [first, _, _] = &self.0;
        first
    }
}

impl TryFrom<Vec<String>> for TokenSymbolSet {
    type Error = ScenarioError;

    fn try_from(symbols: Vec<String>) -> Result<Self, Self::Error> {
        let got = symbols.len();
        let array: [String; TOKEN_SET_SIZE] =
            symbols
                .try_into()
                .map_err(|_| ScenarioError::InvalidTokenSet {
                    expected: TOKEN_SET_SIZE,
                    got,
                })?;
        Ok(Self(array))
    }
}

/// Allowances granted to one spender, keyed by token symbol.
///
/// Amounts are kept as the decimal strings the gateway returns and compared by
/// exact string equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowanceSnapshot(BTreeMap<String, String>);

impl AllowanceSnapshot {
    /// The approved amount recorded for `token`, if any.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.0.get(token).map(String::as_str)
    }

    /// Whether `token` is recorded with exactly `amount`.
    pub fn matches(&self, token: &str, amount: &str) -> bool {
        self.get(token) == Some(amount)
    }

    /// Number of tokens in the snapshot.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the gateway reported no allowances.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for AllowanceSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Wallet balances keyed by token symbol, including the native asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSheet(BTreeMap<String, String>);

impl BalanceSheet {
    /// The balance string reported for `symbol`, if any.
    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.0.get(symbol).map(String::as_str)
    }

    /// The native-asset balance parsed as a float.
    pub fn native_balance(&self) -> Option<f64> {
        self.get(NATIVE_ASSET_SYMBOL)?.trim().parse::<f64>().ok()
    }
}

impl FromIterator<(String, String)> for BalanceSheet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
