// Path: crates/client/src/transport.rs

use crate::outcome::FailureReason;
use async_trait::async_trait;
use serde_json::Value;

/// The two HTTP verbs the dispatcher needs from a channel to the gateway.
///
/// [`crate::SecureChannel`] is the production implementation. Tests plug in
/// in-memory gateways.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// `GET {base}{path}` and parse the JSON body.
    async fn get(&self, path: &str) -> Result<Value, FailureReason>;

    /// `POST {base}{path}` with a JSON body and parse the JSON response.
    async fn post(&self, path: &str, body: &Value) -> Result<Value, FailureReason>;
}

#[async_trait]
impl<T: GatewayTransport + ?Sized> GatewayTransport for std::sync::Arc<T> {
    async fn get(&self, path: &str) -> Result<Value, FailureReason> {
        (**self).get(path).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, FailureReason> {
        (**self).post(path, body).await
    }
}
