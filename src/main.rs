//! This file defines the sales-analytics binary entry point.

use sales_analytics::app;
use sales_analytics::cli;
use sales_analytics::metrics;
use sales_analytics::server;
use sales_analytics::tracing;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing();
    ::tracing::debug!("{:?}", args);
    metrics::register_metrics();
    let service = app::service(&args);
    server::serve(&args, service).await;
}
