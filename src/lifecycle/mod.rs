//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Start simulated endpoint (if needed) → Build dispatcher
//!
//! Shutdown (shutdown.rs):
//!     Batch finished or abandoned → Signal endpoint → Drain briefly → Exit
//!
//! Signals (signals.rs):
//!     SIGINT → Abandon the running batch
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{prepare, Prepared, StartupError};
