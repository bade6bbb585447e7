//! Pawguard rate limit verification probe.

#![forbid(unsafe_code)]

mod probe_config;
mod probe_runner;

use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use pawguard_core::AppError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::probe_config::ProbeConfig;
use crate::probe_runner::run_probe;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = match ProbeConfig::try_parse() {
        Ok(config) => config,
        Err(usage) => {
            let _ = usage.print();
            return match usage.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match probe(&config).await {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(probe_error) => {
            error!(error = %probe_error, target = %config.target, "probe aborted");
            ExitCode::FAILURE
        }
    }
}

async fn probe(config: &ProbeConfig) -> Result<String, AppError> {
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    info!(
        target = %config.target,
        max_requests = config.max_requests,
        "pawguard-probe started"
    );

    let outcome = run_probe(&http_client, &config.target, config.max_requests, |step| {
        println!("request {}: {}", step.request_index, step.status);
    })
    .await?;

    Ok(outcome.to_string())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
