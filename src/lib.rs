//! Fan-out request dispatcher library.
//!
//! Launches a fixed number of concurrent requests against one endpoint under
//! a shared deadline, waits for all of them, and classifies each as success,
//! timeout or failure.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::DispatcherConfig;
pub use dispatch::{BatchReport, Dispatcher, Endpoint, Outcome};
pub use http::DelayedEndpoint;
pub use lifecycle::Shutdown;
