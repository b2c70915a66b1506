// Path: crates/forge/src/lib.rs
#![forbid(unsafe_code)]
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

//! # Gateway Forge Library
//!
//! Drives a running gateway through the token-approval scenario and asserts
//! every step of it.
//!
//! ## Architectural Boundary
//!
//! `forge` is an *external consumer* of the gateway. It only talks to it
//! through the public HTTPS API, using `gateway-client`, and never assumes
//! anything about how the gateway stores or signs transactions. The same
//! scenario can therefore be pointed at a local gateway, a shared staging
//! deployment, or the in-memory [`testing::GatewayDouble`].
//!
//! This crate contains modules for:
//! - `runner`: Loading configuration, opening the secure channel and running the scenario under a deadline.
//! - `testing`: The scenario itself, the confirmation poller, and an in-memory gateway for tests.

pub mod runner;
pub mod testing;

pub use runner::{check_config, connect, run_scenario};
pub use testing::{ScenarioOrchestrator, ScenarioReport, ScenarioSettings};
