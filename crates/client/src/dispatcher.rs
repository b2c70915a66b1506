// Path: crates/client/src/dispatcher.rs

//! The uniform call surface over a [`GatewayTransport`].
//!
//! The dispatcher owns the wallet credential. `submit` calls get
//! `params.privateKey` set right before transmission; `query` calls are sent
//! without a body. Whatever goes wrong (connection, TLS, non-2xx status, bad
//! body) is logged with the path and returned as [`CallOutcome::Failed`].

use crate::outcome::{decode_value, CallOutcome, FailureReason};
use crate::transport::GatewayTransport;
use gateway_telemetry::sinks::{self, MetricsSink};
use gateway_types::app::Credential;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::time::Instant;

/// Field the credential is injected into.
pub const PRIVATE_KEY_FIELD: &str = "privateKey";

/// The two call classes of the gateway API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// HTTP GET; parameters are ignored and the credential is not sent.
    Query,
    /// HTTP POST with a JSON body carrying the credential.
    Submit,
}

/// One request, built per call and consumed by [`Dispatcher::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointCall {
    pub method: Method,
    pub path: String,
    pub params: Map<String, Value>,
}

impl EndpointCall {
    pub fn query(path: impl Into<String>) -> Self {
        Self {
            method: Method::Query,
            path: path.into(),
            params: Map::new(),
        }
    }

    pub fn submit(path: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            method: Method::Submit,
            path: path.into(),
            params,
        }
    }
}

/// Sends [`EndpointCall`]s over a transport on behalf of one wallet.
pub struct Dispatcher<T> {
    transport: T,
    credential: Credential,
    metrics: &'static dyn MetricsSink,
}

impl<T> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

impl<T: GatewayTransport> Dispatcher<T> {
    pub fn new(transport: T, credential: Credential) -> Self {
        Self {
            transport,
            credential,
            metrics: sinks::nop(),
        }
    }

    /// Records call counts and latencies into `metrics`.
    pub fn with_metrics(mut self, metrics: &'static dyn MetricsSink) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn metrics(&self) -> &'static dyn MetricsSink {
        self.metrics
    }

    /// `GET path`, decoded into `R`.
    pub async fn query<R: DeserializeOwned>(&self, path: &str) -> CallOutcome<R> {
        self.dispatch(EndpointCall::query(path)).await
    }

    /// `POST path` with `params` plus the injected credential, decoded into `R`.
    pub async fn submit<R: DeserializeOwned>(
        &self,
        path: &str,
        params: Map<String, Value>,
    ) -> CallOutcome<R> {
        self.dispatch(EndpointCall::submit(path, params)).await
    }

    pub async fn dispatch<R: DeserializeOwned>(&self, call: EndpointCall) -> CallOutcome<R> {
        let EndpointCall {
            method,
            path,
            mut params,
        } = call;
        let started = Instant::now();

        let raw = match method {
            Method::Query => self.transport.get(&path).await,
            Method::Submit => {
                params.insert(
                    PRIVATE_KEY_FIELD.to_string(),
                    Value::String(self.credential.private_key().to_string()),
                );
                self.transport.post(&path, &Value::Object(params)).await
            }
        };
        let result = raw.and_then(decode_value::<R>);

        self.metrics
            .observe_call_duration(&path, started.elapsed().as_secs_f64());
        match &result {
            Ok(_) => {
                self.metrics.inc_calls_total(&path, "ok");
                tracing::debug!(target: "dispatcher", path = %path, ?method, "call succeeded");
            }
            Err(reason) => {
                self.metrics.inc_calls_total(&path, reason.kind());
                tracing::warn!(target: "dispatcher", path = %path, kind = reason.kind(), "{} - {}", path, reason);
            }
        }
        result.into()
    }
}

/// Turns a serializable request struct into submit parameters.
pub fn to_params<S: serde::Serialize>(request: &S) -> Result<Map<String, Value>, FailureReason> {
    match serde_json::to_value(request) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(FailureReason::Malformed(format!(
            "request encoded to {} instead of an object",
            other
        ))),
        Err(e) => Err(FailureReason::Malformed(format!("request encoding: {}", e))),
    }
}
