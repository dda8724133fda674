//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher and executions produce:
//!     → logging.rs (structured log events, one per timeout)
//!     → metrics.rs (outcome counters, batch duration histogram)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Batch ID flows through every execution span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
