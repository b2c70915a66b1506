// Path: crates/client/src/outcome.rs
//! The uniform result of a gateway call.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Why a gateway call produced no result.
///
/// Negative scenario steps accept any of these, but the variants keep a
/// correct rejection apart from a dropped connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    /// The gateway answered with a non-2xx status.
    #[error("gateway rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    /// Connection, TLS handshake or I/O failure before a response arrived.
    #[error("transport failure: {0}")]
    Transport(String),
    /// A 2xx response whose body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FailureReason {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FailureReason::Rejected { .. } => "rejected",
            FailureReason::Transport(_) => "transport",
            FailureReason::Malformed(_) => "malformed",
        }
    }

    /// True when the gateway itself refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, FailureReason::Rejected { .. })
    }
}

/// `Ok(value)` on a successful round trip, `Failed(reason)` otherwise.
///
/// The dispatcher never returns an error or panics; every failure it observes
/// ends up as a `Failed` outcome.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum CallOutcome<T> {
    Ok(T),
    Failed(FailureReason),
}

impl<T> CallOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, CallOutcome::Ok(_))
    }

    /// The value, discarding the failure reason.
    pub fn ok(self) -> Option<T> {
        match self {
            CallOutcome::Ok(value) => Some(value),
            CallOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            CallOutcome::Ok(_) => None,
            CallOutcome::Failed(reason) => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<T, FailureReason> {
        match self {
            CallOutcome::Ok(value) => Ok(value),
            CallOutcome::Failed(reason) => Err(reason),
        }
    }
}

impl<T> From<Result<T, FailureReason>> for CallOutcome<T> {
    fn from(result: Result<T, FailureReason>) -> Self {
        match result {
            Ok(value) => CallOutcome::Ok(value),
            Err(reason) => CallOutcome::Failed(reason),
        }
    }
}

impl CallOutcome<Value> {
    /// Decodes a successful JSON body into `D`. A shape mismatch becomes `Failed(Malformed)`.
    pub fn decode<D: DeserializeOwned>(self) -> CallOutcome<D> {
        match self {
            CallOutcome::Ok(value) => decode_value(value).into(),
            CallOutcome::Failed(reason) => CallOutcome::Failed(reason),
        }
    }
}

pub(crate) fn decode_value<D: DeserializeOwned>(value: Value) -> Result<D, FailureReason> {
    serde_json::from_value(value).map_err(|e| FailureReason::Malformed(e.to_string()))
}
