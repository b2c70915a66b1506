// Path: crates/client/src/gateway_client.rs
use crate::dispatcher::{to_params, Dispatcher};
use crate::outcome::CallOutcome;
use crate::transport::GatewayTransport;
use gateway_types::app::{
    AllowancesRequest, AllowancesResponse, ApprovalOutcome, ApproveRequest, BalancesRequest,
    BalancesResponse, Credential, NonceResponse, StatusResponse,
};
use gateway_types::endpoints;
use gateway_telemetry::sinks::MetricsSink;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A typed proxy for the gateway's Ethereum endpoints.
#[derive(Debug)]
pub struct GatewayClient<T> {
    dispatcher: Dispatcher<T>,
}

impl<T: GatewayTransport> GatewayClient<T> {
    pub fn new(transport: T, credential: Credential) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport, credential),
        }
    }

    pub fn with_metrics(self, metrics: &'static dyn MetricsSink) -> Self {
        Self {
            dispatcher: self.dispatcher.with_metrics(metrics),
        }
    }

    /// The dispatcher underneath, for untyped calls.
    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    async fn submit<S: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        request: &S,
    ) -> CallOutcome<R> {
        match to_params(request) {
            Ok(params) => self.dispatcher.submit(path, params).await,
            Err(reason) => CallOutcome::Failed(reason),
        }
    }

    /// `GET /`.
    pub async fn status(&self) -> CallOutcome<StatusResponse> {
        self.dispatcher.query(endpoints::STATUS).await
    }

    /// `POST /eth/balances`.
    pub async fn balances(&self, token_symbols: &[String]) -> CallOutcome<BalancesResponse> {
        let request = BalancesRequest {
            token_symbols: token_symbols.to_vec(),
        };
        self.submit(endpoints::BALANCES, &request).await
    }

    /// `POST /eth/allowances`.
    pub async fn allowances(
        &self,
        token_symbols: &[String],
        spender: &str,
    ) -> CallOutcome<AllowancesResponse> {
        let request = AllowancesRequest {
            token_symbols: token_symbols.to_vec(),
            spender: spender.to_string(),
        };
        self.submit(endpoints::ALLOWANCES, &request).await
    }

    /// `POST /eth/nonce`.
    pub async fn nonce(&self) -> CallOutcome<NonceResponse> {
        self.submit(endpoints::NONCE, &serde_json::Map::new()).await
    }

    /// `POST /eth/approve`.
    pub async fn approve(&self, request: &ApproveRequest) -> CallOutcome<ApprovalOutcome> {
        self.submit(endpoints::APPROVE, request).await
    }
}
