// Path: crates/forge/src/runner.rs

//! Wiring between configuration, the secure channel and the scenario.

use crate::testing::{ScenarioOrchestrator, ScenarioReport};
use anyhow::{anyhow, Context, Result};
use gateway_client::{GatewayClient, GatewayTransport, SecureChannel};
use gateway_types::app::Credential;
use gateway_types::config::{CertificateBundle, HarnessConfig};
use std::path::Path;
use std::time::Duration;

/// Reads the certificates named by `config` and builds a client over a fresh
/// secure channel. No request is sent.
pub fn connect(config: &HarnessConfig, credential: Credential) -> Result<GatewayClient<SecureChannel>> {
    let bundle = CertificateBundle::load(&config.gateway, &config.tls)
        .context("failed to read gateway certificates")?;
    let channel = SecureChannel::new(&bundle, config.gateway.request_timeout())
        .context("failed to configure the mTLS channel")?;
    tracing::info!(target: "forge", base_url = %channel.base_url(), "Secure channel ready");
    Ok(GatewayClient::new(channel, credential))
}

/// Loads the config at `path` and checks that its certificates form a usable
/// channel configuration.
pub fn check_config(path: &Path) -> Result<HarnessConfig> {
    let config = HarnessConfig::load(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    let bundle = CertificateBundle::load(&config.gateway, &config.tls)
        .context("failed to read gateway certificates")?;
    SecureChannel::new(&bundle, config.gateway.request_timeout())
        .context("failed to configure the mTLS channel")?;
    Ok(config)
}

/// Runs the scenario, failing if it has not finished within `deadline`.
pub async fn run_scenario<T: GatewayTransport>(
    orchestrator: &ScenarioOrchestrator<T>,
    deadline: Duration,
) -> Result<ScenarioReport> {
    match tokio::time::timeout(deadline, orchestrator.run()).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(anyhow!("scenario did not finish within {:?}", deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{GatewayDouble, PollPolicy, ScenarioSettings};
    use std::sync::Arc;

    fn settings(poll: PollPolicy) -> ScenarioSettings {
        ScenarioSettings {
            tokens: vec!["WETH".into(), "USDC".into(), "DAI".into()],
            spender: "0xConnectorAddr".into(),
            allowance: "5000000".into(),
            poll,
        }
    }

    fn gateway(settle_after: Option<u32>) -> Arc<GatewayDouble> {
        Arc::new(
            GatewayDouble::builder()
                .with_token("WETH", "2", "0")
                .with_token("USDC", "10", "0")
                .with_token("DAI", "3", "0")
                .settle_after(settle_after)
                .build(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_cuts_a_run_that_never_settles() {
        let client = GatewayClient::new(gateway(None), Credential::new("0xkey").unwrap());
        let policy = PollPolicy {
            interval: Duration::from_secs(13),
            max_attempts: None,
            timeout: None,
        };
        let orchestrator = ScenarioOrchestrator::new(client, settings(policy));

        let err = run_scenario(&orchestrator, Duration::from_secs(300))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("did not finish"), "{}", err);
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_errors_pass_through() {
        let client = GatewayClient::new(gateway(Some(1)), Credential::new("0xkey").unwrap());
        let mut settings = settings(PollPolicy::fixed(Duration::from_secs(13), 5));
        settings.tokens.pop();
        let orchestrator = ScenarioOrchestrator::new(client, settings);

        let err = run_scenario(&orchestrator, Duration::from_secs(300))
            .await
            .unwrap_err();
        assert!(err
            .downcast_ref::<gateway_types::error::ScenarioError>()
            .is_some());
    }
}
