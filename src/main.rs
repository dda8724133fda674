//! Fan-out request dispatcher (v1)
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                 DISPATCHER                   │
//!   config + flags   │                                              │
//!   ─────────────────┼─▶ startup ──▶ SharedDeadline + Barrier(N)    │
//!                    │                     │                        │
//!                    │        ┌────────────┼────────────┐           │
//!                    │        ▼            ▼            ▼           │
//!                    │    execution    execution ... execution ─────┼──▶ endpoint
//!                    │        │            │            │           │   (external or
//!                    │        └────────────┼────────────┘           │    simulated)
//!                    │                     ▼                        │
//!   summary + elapsed│               BatchReport                    │
//!   ◀────────────────┼──────────────────────                        │
//!                    └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

use fanout_dispatcher::config::{load_config, validate_config, DispatcherConfig};
use fanout_dispatcher::lifecycle::{self, signals};
use fanout_dispatcher::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "fanout-dispatcher")]
#[command(about = "Fire concurrent requests at one endpoint under a shared deadline", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target URL. Without it a simulated endpoint is started locally.
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Number of concurrent executions.
    #[arg(short = 'n', long)]
    workers: Option<usize>,

    /// Shared deadline in milliseconds.
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Response latency of the simulated endpoint in milliseconds.
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Log level when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,

    /// Exit non-zero if any execution failed.
    #[arg(long)]
    strict: bool,

    /// Print the batch summary as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut DispatcherConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.dispatch.endpoint = Some(endpoint.clone());
        }
        if let Some(workers) = self.workers {
            config.dispatch.worker_count = workers;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.dispatch.timeout_ms = timeout_ms;
        }
        if let Some(latency_ms) = self.latency_ms {
            config.endpoint.latency_ms = latency_ms;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DispatcherConfig::default(),
    };
    cli.apply_overrides(&mut config);

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("Invalid configuration: {}", error);
        }
        return Ok(ExitCode::from(2));
    }

    logging::init_logging(&config.observability.log_level)?;

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let prepared = lifecycle::prepare(&config).await?;

    let batch = prepared.dispatcher.dispatch(
        &prepared.endpoint,
        config.dispatch.worker_count,
        config.dispatch.timeout(),
    );
    let finished = tokio::select! {
        result = batch => Some(result),
        _ = signals::wait_for_ctrl_c() => None,
    };

    prepared.shutdown().await;

    let report = match finished {
        Some(result) => result?,
        None => {
            tracing::warn!("Batch abandoned");
            return Ok(ExitCode::from(130));
        }
    };

    let summary = report.summary();
    if cli.json {
        let output = json!({
            "batch_id": report.batch_id,
            "summary": summary,
            "elapsed_ms": report.elapsed.as_secs_f64() * 1000.0,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} succeeded, {} timed out, {} failed",
            summary.succeeded, summary.timed_out, summary.failed
        );
        println!("{:?}", report.elapsed);
    }

    if cli.strict {
        if let Err(e) = report.into_result() {
            eprintln!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "fanout-dispatcher",
            "-n",
            "3",
            "--timeout-ms",
            "5",
            "--latency-ms",
            "10",
            "--strict",
        ]);
        let mut config = DispatcherConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.dispatch.worker_count, 3);
        assert_eq!(config.dispatch.timeout_ms, 5);
        assert_eq!(config.endpoint.latency_ms, 10);
        assert!(config.dispatch.endpoint.is_none());
        assert!(cli.strict);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::parse_from(["fanout-dispatcher"]);
        let mut config = DispatcherConfig::default();
        config.dispatch.worker_count = 7;
        cli.apply_overrides(&mut config);
        assert_eq!(config.dispatch.worker_count, 7);
        assert_eq!(config.dispatch.timeout_ms, 50_000);
    }
}
