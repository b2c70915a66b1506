// Path: crates/forge/src/testing/double.rs

//! An in-memory stand-in for the gateway with eventually consistent allowances.
//!
//! Approvals are accepted immediately but only become visible in allowance
//! queries after a configurable number of further queries, the way a mined
//! transaction shows up a block or two after submission.

use async_trait::async_trait;
use gateway_client::{FailureReason, GatewayTransport};
use gateway_types::endpoints::{self, NATIVE_ASSET_SYMBOL};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// One request as the double received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug)]
struct PendingApproval {
    token: String,
    amount: String,
    queries_left: u32,
}

#[derive(Debug)]
struct DoubleState {
    native_balance: String,
    balances: BTreeMap<String, String>,
    allowances: BTreeMap<String, String>,
    pending: Vec<PendingApproval>,
    nonce: u64,
    offline: bool,
    requests: Vec<RecordedRequest>,
}

/// Builder for [`GatewayDouble`].
#[derive(Debug, Clone)]
pub struct GatewayDoubleBuilder {
    native_balance: String,
    tokens: BTreeMap<String, (String, String)>,
    settle_after: Option<u32>,
    reject_approvals: Vec<String>,
    dropped_after: BTreeMap<String, usize>,
}

impl Default for GatewayDoubleBuilder {
    fn default() -> Self {
        Self {
            native_balance: "1.25".to_string(),
            tokens: BTreeMap::new(),
            settle_after: Some(1),
            reject_approvals: Vec::new(),
            dropped_after: BTreeMap::new(),
        }
    }
}

impl GatewayDoubleBuilder {
    /// Registers a supported token with its balance and current allowance.
    pub fn with_token(mut self, symbol: &str, balance: &str, allowance: &str) -> Self {
        self.tokens
            .insert(symbol.to_string(), (balance.to_string(), allowance.to_string()));
        self
    }

    /// Sets the native-asset balance reported under `ETH`.
    pub fn with_native_balance(mut self, balance: &str) -> Self {
        self.native_balance = balance.to_string();
        self
    }

    /// Approvals become visible after this many allowance queries. `None` means never.
    pub fn settle_after(mut self, queries: Option<u32>) -> Self {
        self.settle_after = queries;
        self
    }

    /// Makes every approval of `symbol` fail as if the transaction reverted.
    pub fn reject_approvals_of(mut self, symbol: &str) -> Self {
        self.reject_approvals.push(symbol.to_string());
        self
    }

    /// Lets the first `requests` calls to `path` through, then fails every
    /// later one at the transport level.
    pub fn drop_connections_after(mut self, path: &str, requests: usize) -> Self {
        self.dropped_after.insert(path.to_string(), requests);
        self
    }

    pub fn build(self) -> GatewayDouble {
        let (balances, allowances) = self
            .tokens
            .into_iter()
            .map(|(symbol, (balance, allowance))| ((symbol.clone(), balance), (symbol, allowance)))
            .unzip();
        GatewayDouble {
            settle_after: self.settle_after,
            reject_approvals: self.reject_approvals,
            dropped_after: self.dropped_after,
            state: Mutex::new(DoubleState {
                native_balance: self.native_balance,
                balances,
                allowances,
                pending: Vec::new(),
                nonce: 0,
                offline: false,
                requests: Vec::new(),
            }),
        }
    }
}

/// The in-memory gateway.
#[derive(Debug)]
pub struct GatewayDouble {
    settle_after: Option<u32>,
    reject_approvals: Vec<String>,
    dropped_after: BTreeMap<String, usize>,
    state: Mutex<DoubleState>,
}

impl GatewayDouble {
    pub fn builder() -> GatewayDoubleBuilder {
        GatewayDoubleBuilder::default()
    }

    fn lock(&self) -> MutexGuard<'_, DoubleState> {
        // A poisoned lock only means another test thread panicked mid-request.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received for `path`.
    pub fn count(&self, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|request| request.path == path)
            .count()
    }

    /// While offline every request fails at the transport level.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// The allowance currently visible for `symbol`.
    pub fn visible_allowance(&self, symbol: &str) -> Option<String> {
        self.lock().allowances.get(symbol).cloned()
    }

    /// Records the request and decides whether its connection goes through.
    fn receive(&self, state: &mut DoubleState, request: RecordedRequest) -> Result<(), FailureReason> {
        let path = request.path.clone();
        state.requests.push(request);
        let seen = state.requests.iter().filter(|r| r.path == path).count();
        let dropped = self
            .dropped_after
            .get(&path)
            .is_some_and(|allowed| seen > *allowed);
        if state.offline || dropped {
            return Err(FailureReason::Transport("connection refused".into()));
        }
        Ok(())
    }

    fn handle_post(&self, state: &mut DoubleState, path: &str, body: &Value) -> Result<Value, FailureReason> {
        let params = body.as_object().ok_or_else(|| rejected(400, "body must be an object"))?;
        match params.get("privateKey").and_then(Value::as_str) {
            Some(key) if !key.is_empty() => {}
            _ => return Err(rejected(401, "privateKey is required")),
        }

        match path {
            endpoints::BALANCES => {
                let symbols = token_symbols(params)?;
                let mut balances = Map::new();
                balances.insert(NATIVE_ASSET_SYMBOL.to_string(), json!(state.native_balance));
                for symbol in symbols {
                    let balance = state
                        .balances
                        .get(&symbol)
                        .ok_or_else(|| unsupported_token(&symbol))?;
                    balances.insert(symbol, json!(balance));
                }
                Ok(json!({ "network": "double", "balances": balances }))
            }
            endpoints::ALLOWANCES => {
                let symbols = token_symbols(params)?;
                required_str(params, "spender")?;
                self.advance_pending(state);
                let mut approvals = Map::new();
                for symbol in symbols {
                    let allowance = state
                        .allowances
                        .get(&symbol)
                        .ok_or_else(|| unsupported_token(&symbol))?;
                    approvals.insert(symbol, json!(allowance));
                }
                Ok(json!({ "network": "double", "approvals": approvals }))
            }
            endpoints::NONCE => Ok(json!({ "nonce": state.nonce })),
            endpoints::APPROVE => self.approve(state, params),
            other => Err(rejected(404, &format!("no route for POST {}", other))),
        }
    }

    fn approve(&self, state: &mut DoubleState, params: &Map<String, Value>) -> Result<Value, FailureReason> {
        let token = required_str(params, "token")?;
        if !state.allowances.contains_key(token) {
            return Err(unsupported_token(token));
        }
        let spender = required_str(params, "spender")?;
        if !is_address(spender) {
            return Err(rejected(500, &format!("Invalid spender address {}", spender)));
        }
        let amount = required_str(params, "amount")?;
        if amount.is_empty() || !amount.chars().all(|c| c.is_ascii_digit()) {
            return Err(rejected(500, &format!("Invalid amount {}", amount)));
        }
        let nonce = match params.get("nonce") {
            Some(value) => value
                .as_u64()
                .ok_or_else(|| rejected(400, "nonce must be an integer"))?,
            None => state.nonce,
        };
        if nonce != state.nonce {
            return Err(rejected(
                500,
                &format!("nonce {} does not match expected {}", nonce, state.nonce),
            ));
        }
        if self.reject_approvals.iter().any(|symbol| symbol == token) {
            return Err(rejected(500, "transaction reverted"));
        }

        state.nonce += 1;
        match self.settle_after {
            Some(0) => {
                state.allowances.insert(token.to_string(), amount.to_string());
            }
            Some(queries) => state.pending.push(PendingApproval {
                token: token.to_string(),
                amount: amount.to_string(),
                queries_left: queries,
            }),
            None => {}
        }
        Ok(json!({
            "network": "double",
            "spender": spender,
            "amount": amount,
            "nonce": nonce,
            "approval": { "hash": format!("0x{:064x}", nonce) },
        }))
    }

    fn advance_pending(&self, state: &mut DoubleState) {
        for pending in state.pending.iter_mut() {
            pending.queries_left = pending.queries_left.saturating_sub(1);
        }
        let (settled, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pending)
            .into_iter()
            .partition(|pending| pending.queries_left == 0);
        state.pending = waiting;
        for approval in settled {
            state.allowances.insert(approval.token, approval.amount);
        }
    }
}

#[async_trait]
impl GatewayTransport for GatewayDouble {
    async fn get(&self, path: &str) -> Result<Value, FailureReason> {
        let mut state = self.lock();
        self.receive(
            &mut state,
            RecordedRequest {
                method: "GET",
                path: path.to_string(),
                body: None,
            },
        )?;
        match path {
            endpoints::STATUS => Ok(json!({ "status": "ok" })),
            other => Err(rejected(404, &format!("no route for GET {}", other))),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, FailureReason> {
        let mut state = self.lock();
        self.receive(
            &mut state,
            RecordedRequest {
                method: "POST",
                path: path.to_string(),
                body: Some(body.clone()),
            },
        )?;
        self.handle_post(&mut state, path, body)
    }
}

fn rejected(status: u16, message: &str) -> FailureReason {
    FailureReason::Rejected {
        status,
        body: json!({ "message": message }).to_string(),
    }
}

fn unsupported_token(symbol: &str) -> FailureReason {
    rejected(500, &format!("Token not supported: {}", symbol))
}

fn required_str<'a>(params: &'a Map<String, Value>, field: &str) -> Result<&'a str, FailureReason> {
    params
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| rejected(400, &format!("missing parameter {}", field)))
}

fn token_symbols(params: &Map<String, Value>) -> Result<Vec<String>, FailureReason> {
    let symbols = params
        .get("tokenSymbols")
        .and_then(Value::as_array)
        .ok_or_else(|| rejected(400, "missing parameter tokenSymbols"))?;
    symbols
        .iter()
        .map(|symbol| {
            symbol
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| rejected(400, "tokenSymbols must be strings"))
        })
        .collect()
}

fn is_address(candidate: &str) -> bool {
    candidate.len() > 2 && candidate.starts_with("0x")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double(settle_after: Option<u32>) -> GatewayDouble {
        GatewayDouble::builder()
            .with_token("WETH", "2", "0")
            .settle_after(settle_after)
            .build()
    }

    fn approve_body(nonce: u64) -> Value {
        json!({
            "privateKey": "k",
            "token": "WETH",
            "spender": "0xabc",
            "amount": "5000000",
            "nonce": nonce,
        })
    }

    fn allowances_body() -> Value {
        json!({ "privateKey": "k", "tokenSymbols": ["WETH"], "spender": "0xabc" })
    }

    #[tokio::test]
    async fn approval_becomes_visible_after_the_configured_queries() {
        let gateway = double(Some(2));
        gateway.post(endpoints::APPROVE, &approve_body(0)).await.unwrap();
        assert_eq!(gateway.visible_allowance("WETH").as_deref(), Some("0"));

        gateway.post(endpoints::ALLOWANCES, &allowances_body()).await.unwrap();
        assert_eq!(gateway.visible_allowance("WETH").as_deref(), Some("0"));

        gateway.post(endpoints::ALLOWANCES, &allowances_body()).await.unwrap();
        assert_eq!(gateway.visible_allowance("WETH").as_deref(), Some("5000000"));
    }

    #[tokio::test]
    async fn stale_nonce_is_rejected() {
        let gateway = double(Some(0));
        gateway.post(endpoints::APPROVE, &approve_body(0)).await.unwrap();
        let err = gateway
            .post(endpoints::APPROVE, &approve_body(0))
            .await
            .unwrap_err();
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn non_numeric_amount_is_rejected_for_a_valid_spender() {
        let gateway = double(Some(0));
        let mut body = approve_body(0);
        body["amount"] = json!("number");

        let err = gateway.post(endpoints::APPROVE, &body).await.unwrap_err();

        match err {
            FailureReason::Rejected { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("Invalid amount number"), "{}", body);
            }
            other => panic!("expected a rejection, got {:?}", other),
        }
        // Nothing was submitted, so the nonce is still free.
        gateway.post(endpoints::APPROVE, &approve_body(0)).await.unwrap();
    }

    #[tokio::test]
    async fn connections_drop_after_the_allowed_requests() {
        let gateway = GatewayDouble::builder()
            .with_token("WETH", "2", "0")
            .drop_connections_after(endpoints::NONCE, 1)
            .build();
        let body = json!({ "privateKey": "k" });

        assert!(gateway.post(endpoints::NONCE, &body).await.is_ok());
        let err = gateway.post(endpoints::NONCE, &body).await.unwrap_err();
        assert_eq!(err.kind(), "transport");
        assert!(gateway.get(endpoints::STATUS).await.is_ok());
        assert_eq!(gateway.count(endpoints::NONCE), 2);
    }

    #[tokio::test]
    async fn posts_without_a_key_are_unauthorized() {
        let gateway = double(Some(0));
        let err = gateway
            .post(endpoints::NONCE, &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, FailureReason::Rejected { status: 401, .. }));
    }
}
