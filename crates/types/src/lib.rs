// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
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

//! # Gateway Forge Types
//!
//! The foundational library for the gateway approval forge. It holds the data
//! structures exchanged with the gateway, the harness configuration and the
//! error enums shared by every other crate in the workspace.
//!
//! ## Architectural Role
//!
//! `gateway-types` has no networking dependencies. The transport lives in
//! `gateway-client` and the scenario driver in `gateway-forge`; both build on
//! the canonical definitions here so that the wire shapes and the
//! configuration have exactly one source of truth.

/// Domain data: credentials, token sets, allowance snapshots and wire shapes.
pub mod app;
/// Harness configuration loaded from TOML, and the certificate bundle it points at.
pub mod config;
/// Well-known gateway endpoint paths.
pub mod endpoints;
/// A unified set of all error types used across the workspace.
pub mod error;
