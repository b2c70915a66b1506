// Path: crates/forge/tests/approval_scenario.rs

//! Runs the full approval scenario against the in-memory gateway.

use gateway_client::GatewayClient;
use gateway_forge::testing::{GatewayDouble, GatewayDoubleBuilder, PollPolicy};
use gateway_forge::{ScenarioOrchestrator, ScenarioSettings};
use gateway_types::app::{Credential, ScenarioStep};
use gateway_types::endpoints;
use gateway_types::error::ScenarioError;
use std::sync::Arc;
use std::time::Duration;

const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe512961708279f3c7a3ea8a3c5b2d11";
const SPENDER: &str = "0xConnectorAddr";
const BLOCK_TIME: Duration = Duration::from_secs(13);

fn gateway() -> GatewayDoubleBuilder {
    GatewayDouble::builder()
        .with_token("WETH", "2.5", "0")
        .with_token("USDC", "100", "0")
        .with_token("DAI", "40", "0")
}

fn settings() -> ScenarioSettings {
    ScenarioSettings {
        tokens: vec!["WETH".into(), "USDC".into(), "DAI".into()],
        spender: SPENDER.into(),
        allowance: "5000000".into(),
        poll: PollPolicy::fixed(BLOCK_TIME, 5),
    }
}

fn orchestrator(
    gateway: &Arc<GatewayDouble>,
    settings: ScenarioSettings,
) -> ScenarioOrchestrator<Arc<GatewayDouble>> {
    let client = GatewayClient::new(gateway.clone(), Credential::new(KEY).unwrap());
    ScenarioOrchestrator::new(client, settings)
}

#[tokio::test(start_paused = true)]
async fn full_scenario_passes_against_a_healthy_gateway() {
    let gateway = Arc::new(gateway().settle_after(Some(2)).build());

    let report = orchestrator(&gateway, settings()).run().await.unwrap();

    let steps: Vec<ScenarioStep> = report.steps.iter().map(|record| record.step).collect();
    assert_eq!(steps, ScenarioStep::ALL.to_vec());
    assert_eq!(report.ambiguous_steps().count(), 0);
    assert!(report.balances.native_balance().unwrap() > 0.0);
    assert_eq!(report.initial_allowances.get("WETH"), Some("0"));

    let confirmed: Vec<(&str, u32, u64)> = report
        .confirmations
        .iter()
        .map(|c| (c.token.as_str(), c.attempts, c.nonce))
        .collect();
    assert_eq!(confirmed, vec![("WETH", 2, 0), ("USDC", 2, 1)]);
    assert_eq!(report.confirmations[0].waited, BLOCK_TIME * 2);

    assert_eq!(gateway.visible_allowance("WETH").as_deref(), Some("5000000"));
    assert_eq!(gateway.visible_allowance("USDC").as_deref(), Some("5000000"));
    assert_eq!(gateway.visible_allowance("DAI").as_deref(), Some("0"));
}

#[tokio::test(start_paused = true)]
async fn negative_steps_record_why_the_gateway_refused() {
    let gateway = Arc::new(gateway().build());

    let report = orchestrator(&gateway, settings()).run().await.unwrap();

    let detail = |step: ScenarioStep| {
        report
            .steps
            .iter()
            .find(|record| record.step == step)
            .map(|record| record.detail.clone())
            .unwrap()
    };
    assert!(detail(ScenarioStep::InvalidBalances).contains("Token not supported: ABC"));
    assert!(detail(ScenarioStep::InvalidSpender).contains("Invalid spender address nill"));
    assert!(detail(ScenarioStep::InvalidToken).contains("Token not supported: ABC"));
    // The non-numeric amount request names the spender under `connector`, so it is refused
    // for the missing spender before the amount is looked at.
    let amount = detail(ScenarioStep::InvalidAmount);
    assert!(amount.starts_with("rejected with status 400"), "{}", amount);
    assert!(amount.contains("missing parameter spender"), "{}", amount);
}

#[tokio::test(start_paused = true)]
async fn dropped_connections_pass_negative_steps_as_ambiguous() {
    // The two confirmation approvals go through; every later approval is cut off.
    let gateway = Arc::new(
        gateway()
            .drop_connections_after(endpoints::APPROVE, 2)
            .build(),
    );

    let report = orchestrator(&gateway, settings()).run().await.unwrap();

    assert_eq!(report.steps.len(), ScenarioStep::ALL.len());
    let ambiguous: Vec<ScenarioStep> = report.ambiguous_steps().map(|record| record.step).collect();
    assert_eq!(
        ambiguous,
        vec![
            ScenarioStep::InvalidSpender,
            ScenarioStep::InvalidToken,
            ScenarioStep::InvalidAmount,
        ]
    );
    for record in report.ambiguous_steps() {
        assert!(record.detail.contains("transport failure"), "{}", record.detail);
    }
    assert_eq!(gateway.count(endpoints::APPROVE), 5);
}

#[tokio::test(start_paused = true)]
async fn every_submit_carries_the_credential_and_queries_do_not() {
    let gateway = Arc::new(gateway().build());
    orchestrator(&gateway, settings()).run().await.unwrap();

    let requests = gateway.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, endpoints::STATUS);
    assert!(requests[0].body.is_none());

    for request in requests.iter().filter(|request| request.method == "POST") {
        let body = request.body.as_ref().unwrap();
        assert_eq!(body["privateKey"], KEY, "missing key on {}", request.path);
    }
}

#[tokio::test(start_paused = true)]
async fn matching_allowance_needs_no_recheck() {
    let gateway = Arc::new(
        GatewayDouble::builder()
            .with_token("WETH", "2.5", "5000000")
            .with_token("USDC", "100", "5000000")
            .with_token("DAI", "40", "0")
            .build(),
    );

    let report = orchestrator(&gateway, settings()).run().await.unwrap();

    assert!(report.confirmations.iter().all(|c| c.attempts == 0));
    // The snapshot from the allowance step is reused for the approvals.
    assert_eq!(gateway.count(endpoints::ALLOWANCES), 1);
    assert_eq!(gateway.count(endpoints::APPROVE), 5);
}

#[tokio::test(start_paused = true)]
async fn approval_that_never_settles_times_out() {
    let gateway = Arc::new(gateway().settle_after(None).build());
    let mut settings = settings();
    settings.poll = PollPolicy::fixed(BLOCK_TIME, 4);

    let err = orchestrator(&gateway, settings).run().await.unwrap_err();

    match err {
        ScenarioError::ApprovalTimedOut {
            token,
            amount,
            attempts,
            elapsed,
        } => {
            assert_eq!(token, "WETH");
            assert_eq!(amount, "5000000");
            assert_eq!(attempts, 4);
            assert_eq!(elapsed, BLOCK_TIME * 4);
        }
        other => panic!("expected a timeout, got {:?}", other),
    }
    // No negative approvals after the failed confirmation.
    assert_eq!(gateway.count(endpoints::APPROVE), 1);
}

#[tokio::test(start_paused = true)]
async fn wrong_number_of_tokens_fails_before_any_request() {
    let gateway = Arc::new(gateway().build());
    let mut settings = settings();
    settings.tokens.truncate(2);

    let err = orchestrator(&gateway, settings).run().await.unwrap_err();

    assert_eq!(err, ScenarioError::InvalidTokenSet { expected: 3, got: 2 });
    assert!(gateway.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reverted_approval_aborts_the_run() {
    let gateway = Arc::new(gateway().reject_approvals_of("WETH").build());

    let err = orchestrator(&gateway, settings()).run().await.unwrap_err();

    assert!(
        matches!(&err, ScenarioError::ApprovalFailed { token, .. } if token == "WETH"),
        "{:?}",
        err
    );
}

#[tokio::test(start_paused = true)]
async fn unreachable_gateway_fails_the_status_step() {
    let gateway = Arc::new(gateway().build());
    gateway.set_offline(true);

    let err = orchestrator(&gateway, settings()).run().await.unwrap_err();

    assert!(
        matches!(err, ScenarioError::StepFailed { step: ScenarioStep::Status, .. }),
        "{:?}",
        err
    );
    assert_eq!(gateway.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn empty_wallet_fails_the_balance_step() {
    let gateway = Arc::new(gateway().with_native_balance("0").build());

    let err = orchestrator(&gateway, settings()).run().await.unwrap_err();

    assert!(
        matches!(err, ScenarioError::StepFailed { step: ScenarioStep::Balances, .. }),
        "{:?}",
        err
    );
}

#[tokio::test(start_paused = true)]
async fn allowance_queries_do_not_change_state() {
    let gateway = Arc::new(gateway().build());
    let client = GatewayClient::new(gateway.clone(), Credential::new(KEY).unwrap());
    let tokens: Vec<String> = vec!["WETH".into(), "USDC".into(), "DAI".into()];

    let first = client.allowances(&tokens, SPENDER).await.ok().unwrap();
    let second = client.allowances(&tokens, SPENDER).await.ok().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.approvals.len(), 3);
}
