//! HTTP server subsystem.
//!
//! Hosts the simulated endpoint that batches are dispatched against when no
//! external target is configured.

pub mod server;

pub use server::{DelayedEndpoint, RunningEndpoint};
