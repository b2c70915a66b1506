// Path: crates/telemetry/src/lib.rs
pub mod init;
pub mod prometheus;
pub mod sinks;
