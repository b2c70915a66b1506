// Path: crates/forge/src/main.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Gateway Forge CLI
//!
//! Runs the token-approval scenario against a gateway over mutual TLS.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use gateway_forge::{check_config, connect, run_scenario, ScenarioOrchestrator, ScenarioSettings};
use gateway_telemetry::init::{init_tracing, LogFormat};
use gateway_types::app::Credential;
use gateway_types::config::HarnessConfig;
use std::path::PathBuf;
use tokio::signal;

#[derive(Parser, Debug)]
#[clap(
    name = "gateway-forge",
    version,
    about = "Verification harness for the gateway token-approval API",
    long_about = "Forge drives a running gateway through status, balance, allowance and approval checks over mutual TLS, waiting for each approval to be mined."
)]
struct ForgeCli {
    /// Emit logs as JSON objects instead of text.
    #[clap(long, global = true)]
    json_logs: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the approval scenario against the configured gateway.
    Run(RunArgs),

    /// Loads the config and certificates without contacting the gateway.
    CheckConfig(CheckConfigArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Path to the harness TOML config.
    #[clap(long)]
    config: PathBuf,
    /// Overrides `scenario.tokens`, e.g. `WETH,USDC,DAI`.
    #[clap(long, value_delimiter = ',')]
    tokens: Option<Vec<String>>,
    /// Overrides `scenario.spender`.
    #[clap(long)]
    spender: Option<String>,
    /// Prints the Prometheus text exposition when the run ends.
    #[clap(long)]
    print_metrics: bool,
}

#[derive(clap::Args, Debug)]
struct CheckConfigArgs {
    /// Path to the harness TOML config.
    #[clap(long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = ForgeCli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    if let Err(e) = init_tracing(format) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::CheckConfig(args) => run_check_config(args),
    };
    if let Err(e) = result {
        tracing::error!(target: "forge", "{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: RunArgs) -> Result<()> {
    // The credential is checked before anything else touches the network.
    let credential = Credential::from_env()?;

    let mut config = HarnessConfig::load(&args.config)?;
    if let Some(tokens) = args.tokens {
        config.scenario.tokens = tokens;
    }
    if let Some(spender) = args.spender {
        config.scenario.spender = spender;
    }

    let client = connect(&config, credential)?.with_metrics(gateway_telemetry::prometheus::install());
    let orchestrator = ScenarioOrchestrator::new(client, ScenarioSettings::from(&config));

    let outcome = tokio::select! {
        result = run_scenario(&orchestrator, config.scenario.run_timeout()) => result,
        _ = signal::ctrl_c() => Err(anyhow!("interrupted")),
    };

    if args.print_metrics {
        match gateway_telemetry::prometheus::render() {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::warn!(target: "forge", "Failed to render metrics: {}", e),
        }
    }

    let report = outcome?;
    for step in report.ambiguous_steps() {
        tracing::warn!(target: "forge", step = %step.step, detail = %step.detail, "Negative step passed on a non-rejection failure");
    }
    tracing::info!(target: "forge", steps = report.steps.len(), "All steps passed");
    Ok(())
}

fn run_check_config(args: CheckConfigArgs) -> Result<()> {
    let config = check_config(&args.config)?;
    tracing::info!(
        target: "forge",
        base_url = %config.gateway.base_url(),
        tokens = ?config.scenario.tokens,
        "Configuration is valid"
    );
    Ok(())
}
