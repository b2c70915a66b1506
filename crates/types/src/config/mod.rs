// Path: crates/types/src/config/mod.rs

//! Configuration structures for the gateway forge.
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration of a forge run, read from a TOML file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HarnessConfig {
    /// Where the gateway listens.
    pub gateway: GatewayConfig,
    /// Client certificate material for the mutually authenticated channel.
    pub tls: TlsConfig,
    /// What the scenario operates on.
    pub scenario: ScenarioConfig,
    /// How approvals are confirmed.
    #[serde(default)]
    pub poll: PollConfig,
}

impl HarnessConfig {
    /// Reads and validates a configuration file.
    ///
    /// A relative `tls.certs_dir` is resolved against the directory holding
    /// the file, so a config can sit next to its certificates.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        if let Some(base) = path.parent() {
            config.tls.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Parses and validates configuration text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.host.trim().is_empty() {
            return Err(ConfigError::Invalid("gateway.host must not be empty".into()));
        }
        if self.gateway.port == 0 {
            return Err(ConfigError::Invalid("gateway.port must be non-zero".into()));
        }
        if self.gateway.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "gateway.request_timeout_secs must be non-zero when set".into(),
            ));
        }
        if self.scenario.spender.trim().is_empty() {
            return Err(ConfigError::Invalid("scenario.spender must not be empty".into()));
        }
        if self.scenario.allowance.trim().is_empty() {
            return Err(ConfigError::Invalid("scenario.allowance must not be empty".into()));
        }
        if self.scenario.run_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "scenario.run_timeout_secs must be non-zero".into(),
            ));
        }
        self.poll.validate()
    }
}

/// Address of the gateway under test.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Host name or IP. Certificates may name a different host; the channel
    /// does not check the name.
    #[serde(default = "default_host")]
    pub host: String,
    /// HTTPS port.
    pub port: u16,
    /// Optional per-request timeout. Unset means only the run timeout applies.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_host() -> String {
    "localhost".to_string()
}

impl GatewayConfig {
    /// `https://{host}:{port}`.
    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }

    /// The per-request timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Locations of the PEM files used for mutual TLS.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// Directory holding the three PEM files.
    pub certs_dir: PathBuf,
    /// CA bundle used to verify the gateway's certificate chain.
    #[serde(default = "default_ca_cert")]
    pub ca_cert: String,
    /// Certificate presented by the forge.
    #[serde(default = "default_client_cert")]
    pub client_cert: String,
    /// Private key matching `client_cert`.
    #[serde(default = "default_client_key")]
    pub client_key: String,
}

fn default_ca_cert() -> String {
    "ca_cert.pem".to_string()
}
fn default_client_cert() -> String {
    "client_cert.pem".to_string()
}
fn default_client_key() -> String {
    "client_key.pem".to_string()
}

impl TlsConfig {
    /// Makes a relative `certs_dir` relative to `base` instead of the working directory.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.certs_dir.is_relative() {
            self.certs_dir = base.join(&self.certs_dir);
        }
    }

    /// Full path of the CA bundle.
    pub fn ca_cert_path(&self) -> PathBuf {
        self.certs_dir.join(&self.ca_cert)
    }

    /// Full path of the client certificate.
    pub fn client_cert_path(&self) -> PathBuf {
        self.certs_dir.join(&self.client_cert)
    }

    /// Full path of the client key.
    pub fn client_key_path(&self) -> PathBuf {
        self.certs_dir.join(&self.client_key)
    }
}

/// What the scenario runs against.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// Token symbols. Must hold exactly three; checked when the run starts.
    pub tokens: Vec<String>,
    /// Spender (connector contract) address.
    pub spender: String,
    /// Amount every tested allowance is reset to.
    #[serde(default = "default_allowance")]
    pub allowance: String,
    /// Wall-clock limit for the whole run.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
}

fn default_allowance() -> String {
    "5000000".to_string()
}
fn default_run_timeout_secs() -> u64 {
    300
}

impl ScenarioConfig {
    /// The run timeout as a `Duration`.
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

/// Bounds of the approval confirmation loop.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Pause between allowance re-queries. Defaults to one mainnet block time.
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
    /// Maximum number of re-queries per token.
    #[serde(default = "default_poll_max_attempts")]
    pub max_attempts: Option<u32>,
    /// Maximum time spent confirming one token.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_poll_interval_secs() -> u64 {
    13
}
fn default_poll_max_attempts() -> Option<u32> {
    Some(20)
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
            max_attempts: default_poll_max_attempts(),
            timeout_secs: None,
        }
    }
}

impl PollConfig {
    /// The interval as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// The timeout as a `Duration`, if set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid("poll.interval_secs must be non-zero".into()));
        }
        if self.max_attempts == Some(0) || self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "poll.max_attempts and poll.timeout_secs must be non-zero when set".into(),
            ));
        }
        if self.max_attempts.is_none() && self.timeout_secs.is_none() {
            return Err(ConfigError::Invalid(
                "poll needs at least one of max_attempts or timeout_secs".into(),
            ));
        }
        Ok(())
    }
}

/// PEM material and address for the secure channel, read once at startup.
#[derive(Clone)]
pub struct CertificateBundle {
    /// CA bundle, PEM.
    pub ca_cert: Vec<u8>,
    /// Client certificate chain, PEM.
    pub client_cert: Vec<u8>,
    /// Client private key, PEM.
    pub client_key: Vec<u8>,
    /// Gateway host.
    pub host: String,
    /// Gateway port.
    pub port: u16,
}

impl CertificateBundle {
    /// Reads the three PEM files named by `tls`.
    pub fn load(gateway: &GatewayConfig, tls: &TlsConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            ca_cert: read_file(&tls.ca_cert_path())?,
            client_cert: read_file(&tls.client_cert_path())?,
            client_key: read_file(&tls.client_key_path())?,
            host: gateway.host.clone(),
            port: gateway.port,
        })
    }

    /// `https://{host}:{port}`.
    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for CertificateBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateBundle")
            .field("ca_cert_len", &self.ca_cert.len())
            .field("client_cert_len", &self.client_cert.len())
            .field("client_key", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
