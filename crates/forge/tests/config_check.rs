// Path: crates/forge/tests/config_check.rs

//! Loads configs from disk and builds the secure channel from them, without
//! any network access.

use anyhow::Result;
use gateway_forge::{check_config, connect};
use gateway_types::app::Credential;
use gateway_types::config::HarnessConfig;
use rcgen::{BasicConstraints, Certificate, CertificateParams, IsCa};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONFIG: &str = r#"
[gateway]
host = "localhost"
port = 5000
request_timeout_secs = 30

[tls]
certs_dir = "certs"

[scenario]
tokens = ["WETH", "USDC", "DAI"]
spender = "0xConnectorAddr"

[poll]
interval_secs = 13
max_attempts = 20
"#;

fn write_certs(dir: &Path) -> Result<()> {
    let mut ca_params = CertificateParams::new(vec!["gateway-ca".to_string()]);
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let ca = Certificate::from_params(ca_params)?;
    let client = Certificate::from_params(CertificateParams::new(vec!["forge-client".to_string()]))?;

    fs::create_dir_all(dir)?;
    fs::write(dir.join("ca_cert.pem"), ca.serialize_pem()?)?;
    fs::write(dir.join("client_cert.pem"), client.serialize_pem_with_signer(&ca)?)?;
    fs::write(dir.join("client_key.pem"), client.serialize_private_key_pem())?;
    Ok(())
}

fn workspace(with_certs: bool) -> Result<TempDir> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("forge.toml"), CONFIG)?;
    if with_certs {
        write_certs(&dir.path().join("certs"))?;
    }
    Ok(dir)
}

#[test]
fn check_config_accepts_a_complete_setup() -> Result<()> {
    let dir = workspace(true)?;
    let config = check_config(&dir.path().join("forge.toml"))?;

    assert_eq!(config.gateway.base_url(), "https://localhost:5000");
    assert_eq!(config.tls.certs_dir, dir.path().join("certs"));
    assert_eq!(config.scenario.allowance, "5000000");
    Ok(())
}

#[test]
fn check_config_reports_missing_certificates() -> Result<()> {
    let dir = workspace(false)?;
    let err = check_config(&dir.path().join("forge.toml")).unwrap_err();

    assert!(format!("{:#}", err).contains("ca_cert.pem"), "{:#}", err);
    Ok(())
}

#[test]
fn check_config_reports_an_unreadable_file() {
    let err = check_config(Path::new("/nonexistent/forge.toml")).unwrap_err();
    assert!(err.to_string().contains("failed to load config"));
}

#[test]
fn connect_builds_a_client_without_contacting_the_gateway() -> Result<()> {
    let dir = workspace(true)?;
    let config = HarnessConfig::load(&dir.path().join("forge.toml"))?;

    let client = connect(&config, Credential::new("0xkey")?)?;

    assert_eq!(client.dispatcher().transport().base_url(), "https://localhost:5000");
    Ok(())
}
