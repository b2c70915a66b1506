// Path: crates/types/src/error/mod.rs
//! Core error types for the gateway forge.

use crate::app::ScenarioStep;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating the harness configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration or certificate file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for `HarnessConfig`.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration parsed but violates a constraint.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors related to the wallet credential.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialError {
    /// The environment variable holding the private key is not set.
    #[error("Please define the env variable {0} in order to run the tests")]
    Missing(&'static str),
    /// The private key is present but empty.
    #[error("The env variable {0} is set but empty")]
    Empty(&'static str),
}

/// Errors raised while building the mutually authenticated channel.
#[derive(Error, Debug)]
pub enum TlsSetupError {
    /// A PEM document could not be decoded.
    #[error("Failed to decode PEM in {what}: {source}")]
    Pem {
        /// Which part of the bundle was being decoded.
        what: &'static str,
        /// The underlying decoding error.
        #[source]
        source: std::io::Error,
    },
    /// A PEM document held no usable certificate.
    #[error("No certificates found in {0}")]
    NoCertificates(&'static str),
    /// The client key file held no private key.
    #[error("No private key found in client key")]
    NoPrivateKey,
    /// The TLS library rejected the assembled configuration.
    #[error("TLS configuration rejected: {0}")]
    Rejected(String),
    /// The HTTP client could not be built on top of the TLS configuration.
    #[error("Failed to build HTTPS client: {0}")]
    Client(String),
}

/// Errors that end a scenario run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    /// The token symbol set did not contain exactly three symbols.
    #[error("Expected exactly {expected} token symbols, got {got}")]
    InvalidTokenSet {
        /// Required number of symbols.
        expected: usize,
        /// Number of symbols supplied.
        got: usize,
    },
    /// A step's assertion did not hold.
    #[error("Step '{step}' failed: {reason}")]
    StepFailed {
        /// The step that failed.
        step: ScenarioStep,
        /// What was observed instead of the expected outcome.
        reason: String,
    },
    /// Submitting an approval failed, so there is nothing to confirm.
    #[error("Approval submission for {token} failed: {reason}")]
    ApprovalFailed {
        /// The token whose approval was rejected.
        token: String,
        /// The failure reported by the dispatcher.
        reason: String,
    },
    /// The allowance never reached the submitted amount within the poll policy.
    #[error("Approval of {amount} for {token} not confirmed after {attempts} attempts ({elapsed:?})")]
    ApprovalTimedOut {
        /// The token being confirmed.
        token: String,
        /// The amount that was submitted.
        amount: String,
        /// Allowance re-queries performed.
        attempts: u32,
        /// Wall-clock time spent polling.
        elapsed: Duration,
    },
}
