use clap::Parser;
use tracing_subscriber::EnvFilter;

use route_time_server::cli::{CliError, RouteTimeApp};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = RouteTimeApp::parse();
    args.op.run().await
}
