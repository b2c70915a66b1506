// Path: crates/client/src/security.rs

//! A mutually authenticated HTTPS channel to the gateway.
//!
//! The channel presents the client certificate on every connection and
//! verifies the gateway's chain against the configured CA only. The host name
//! is not checked: the forge talks to `localhost` while the gateway's
//! certificate is usually issued for another name.

use crate::outcome::FailureReason;
use crate::transport::GatewayTransport;
use async_trait::async_trait;
use gateway_types::config::CertificateBundle;
use gateway_types::error::TlsSetupError;
use reqwest::{Client, RequestBuilder};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// One HTTPS client bound to the gateway address, reused for every call of a run.
#[derive(Debug, Clone)]
pub struct SecureChannel {
    client: Client,
    base_url: String,
}

impl SecureChannel {
    /// Builds the channel from the certificate bundle.
    ///
    /// No connection is opened here; the first request performs the handshake.
    pub fn new(
        bundle: &CertificateBundle,
        request_timeout: Option<Duration>,
    ) -> Result<Self, TlsSetupError> {
        let tls = client_tls_config(bundle)?;
        let mut builder = Client::builder().use_preconfigured_tls(tls);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TlsSetupError::Client(e.to_string()))?;

        tracing::debug!(target: "secure_channel", base_url = %bundle.base_url(), "mTLS channel configured");
        Ok(Self {
            client,
            base_url: bundle.base_url(),
        })
    }

    /// `https://{host}:{port}` this channel talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, FailureReason> {
        let response = request
            .send()
            .await
            .map_err(|e| FailureReason::Transport(error_chain(&e)))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FailureReason::Transport(error_chain(&e)))?;

        if !status.is_success() {
            return Err(FailureReason::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| FailureReason::Malformed(format!("invalid JSON body: {}", e)))
    }
}

#[async_trait]
impl GatewayTransport for SecureChannel {
    async fn get(&self, path: &str) -> Result<Value, FailureReason> {
        self.send(self.client.get(self.url(path))).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, FailureReason> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }
}

/// reqwest's top-level message hides the cause (refused, handshake alert, ...).
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn client_tls_config(bundle: &CertificateBundle) -> Result<ClientConfig, TlsSetupError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    // Load the CA certificate
    let ca_certs = read_certs(&bundle.ca_cert, "CA bundle")?;
    let mut root_store = RootCertStore::empty();
    let (added, _ignored) = root_store.add_parsable_certificates(ca_certs);
    if added == 0 {
        return Err(TlsSetupError::NoCertificates("CA bundle"));
    }

    // Load the client's own certificate and private key
    let client_certs = read_certs(&bundle.client_cert, "client certificate")?;
    if client_certs.is_empty() {
        return Err(TlsSetupError::NoCertificates("client certificate"));
    }
    let mut key_reader = bundle.client_key.as_slice();
    let client_key = rustls_pemfile::private_key(&mut key_reader)
        .map_err(|source| TlsSetupError::Pem {
            what: "client key",
            source,
        })?
        .ok_or(TlsSetupError::NoPrivateKey)?;

    let verifier = ChainOnlyVerifier::new(Arc::new(root_store), provider.clone())?;

    ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| TlsSetupError::Rejected(e.to_string()))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_client_auth_cert(client_certs, client_key)
        .map_err(|e| TlsSetupError::Rejected(e.to_string()))
}

fn read_certs(
    pem: &[u8],
    what: &'static str,
) -> Result<Vec<CertificateDer<'static>>, TlsSetupError> {
    let mut reader = pem;
    rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsSetupError::Pem { what, source })
}

/// WebPKI chain verification against the configured roots, minus the name check.
#[derive(Debug)]
struct ChainOnlyVerifier {
    inner: Arc<WebPkiServerVerifier>,
}

impl ChainOnlyVerifier {
    fn new(roots: Arc<RootCertStore>, provider: Arc<CryptoProvider>) -> Result<Self, TlsSetupError> {
        let inner = WebPkiServerVerifier::builder_with_provider(roots, provider)
            .build()
            .map_err(|e| TlsSetupError::Rejected(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl ServerCertVerifier for ChainOnlyVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        // The name is checked after the chain, so a name error means the chain is trusted.
        match self.inner.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        ) {
            Ok(verified) => Ok(verified),
            Err(rustls::Error::InvalidCertificate(
                CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. },
            )) => Ok(ServerCertVerified::assertion()),
            Err(e) => Err(e),
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}
