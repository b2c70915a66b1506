// Path: crates/client/src/lib.rs
//! # Gateway Client Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
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

//! # Gateway Client
//!
//! Provides the client side of the gateway approval API: a mutually
//! authenticated HTTPS channel, a dispatcher that injects the wallet
//! credential and normalizes every failure into a [`CallOutcome`], and a
//! typed client over the individual endpoints.

pub mod dispatcher;
pub mod gateway_client;
pub mod outcome;
pub mod security;
pub mod transport;

// Re-export for convenience
pub use dispatcher::{Dispatcher, EndpointCall, Method};
pub use gateway_client::GatewayClient;
pub use outcome::{CallOutcome, FailureReason};
pub use security::SecureChannel;
pub use transport::GatewayTransport;
