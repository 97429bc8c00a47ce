mod config;
mod feed;
mod mapping;
mod model;
mod normalizer;
mod parser;
mod pipeline;
mod pricing;
mod routing;
mod storage;
mod utils;

use config::load_config;
use feed::HttpFeedSource;
use pipeline::PipelineDriver;
use std::process::ExitCode;
use storage::XmlFileSink;
use tracing::{debug, error, info};

const DEFAULT_CONFIG: &str = "config.json";

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    // Load configuration from file
    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Loaded {}: {} feeds, {} destinations",
        config_path,
        config.feeds.len(),
        config.destinations.len()
    );

    let source = match HttpFeedSource::new() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let sink = XmlFileSink::new(&config.output_dir);

    let report = match PipelineDriver::new(&config, &source, &sink).run().await {
        Ok(report) => report,
        Err(e) => {
            error!("Run aborted, nothing published: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for pass in &report.passes {
        debug!("{} <- {}: {:?}", pass.destination, pass.feed, pass.stats);
    }
    for dest in &report.destinations {
        info!(
            "{} -> {}: {} items, {} prices adjusted",
            dest.destination, dest.file, dest.records, dest.repriced
        );
    }
    let overridden: usize = report.passes.iter().map(|p| p.stats.overridden).sum();
    info!(
        "XML documents published in {}s ({} LT610 corrections)",
        (report.finished_at - report.started_at).num_seconds(),
        overridden
    );
    ExitCode::SUCCESS
}
