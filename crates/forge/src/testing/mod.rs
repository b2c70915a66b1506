// Path: crates/forge/src/testing/mod.rs

//! Helpers for driving and asserting the approval scenario.

pub mod double;
pub mod poll;
pub mod scenario;

pub use double::{GatewayDouble, GatewayDoubleBuilder, RecordedRequest};
pub use poll::{wait_for, Confirmation, ConfirmationPoller, PollOutcome, PollPolicy};
pub use scenario::{ScenarioOrchestrator, ScenarioReport, ScenarioSettings, StepRecord};
