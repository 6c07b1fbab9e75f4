//! Command line interface.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::dashboard::{DashboardError, write_dashboard_data};
use crate::estimate::{EstimateConfig, Estimator, FileCorpus};
use crate::resolve::{ResolveError, resolve};
use crate::routedb::{
    DEFAULT_ROUTE_DB_URL, RouteDbCache, RouteDbCacheConfig, RouteDbClient, RouteDbClientConfig,
    RouteDbError, RouteDbHandle,
};
use crate::web::{AppState, create_router};

pub const DEFAULT_TIMES_DIR: &str = "hk-bus-time-between-stops-pages/times_hourly";

/// Bus travel time estimates from historical stop-to-stop timings
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct RouteTimeApp {
    #[command(subcommand)]
    pub op: Operation,
}

#[derive(Debug, Subcommand)]
pub enum Operation {
    /// run the HTTP server with the dashboard and JSON API
    Serve {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        estimate: EstimateArgs,

        /// port to listen on
        #[arg(long, env = "PORT", default_value_t = 8000)]
        port: u16,

        /// address to bind
        #[arg(long, env = "BIND", default_value = "0.0.0.0")]
        host: String,

        /// directory holding dashboard.html and its assets
        #[arg(long, env = "STATIC_DIR", default_value = "static")]
        static_dir: PathBuf,

        /// hours between route database refreshes; 0 disables refreshing
        #[arg(long, env = "REFRESH_HOURS", default_value_t = 24)]
        refresh_hours: u64,
    },

    /// estimate one route and write the dashboard data script
    Analyze {
        /// route number, e.g. 94
        route: String,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        estimate: EstimateArgs,

        /// variant index when the route has several
        #[arg(long, default_value_t = 0, allow_hyphen_values(true))]
        variant: i64,

        /// pick the variant by destination instead of index
        #[arg(long)]
        dest: Option<String>,

        /// where to write the script
        #[arg(short, long, default_value = "dashboard_data.js")]
        output: PathBuf,
    },
}

/// Where the route database and timing corpus come from.
#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    /// route database URL
    #[arg(long, env = "ROUTE_DB_URL", default_value = DEFAULT_ROUTE_DB_URL)]
    pub db_url: String,

    /// seconds to wait for the route database download
    #[arg(long, env = "ROUTE_DB_TIMEOUT", default_value_t = 120)]
    pub db_timeout_secs: u64,

    /// keep the downloaded route database here and reuse it while fresh
    #[arg(long, env = "ROUTE_DB_CACHE")]
    pub db_cache: Option<PathBuf>,

    /// root of the hourly timing corpus
    #[arg(long, env = "TIMES_DIR", default_value = DEFAULT_TIMES_DIR)]
    pub times_dir: PathBuf,
}

/// Estimation tuning.
#[derive(Debug, Clone, Args)]
pub struct EstimateArgs {
    /// multiplier applied to every historical sample
    #[arg(long, default_value_t = 1.1)]
    pub traffic_factor: f64,

    /// minutes of service assumed after the last scheduled departure window
    #[arg(long, default_value_t = 120)]
    pub service_buffer_mins: u32,

    /// fraction of segments that need data for an estimate
    #[arg(long, default_value_t = 0.5)]
    pub min_coverage: f64,
}

impl From<&EstimateArgs> for EstimateConfig {
    fn from(args: &EstimateArgs) -> Self {
        EstimateConfig::new(
            args.traffic_factor,
            args.service_buffer_mins,
            args.min_coverage,
        )
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    RouteDb(#[from] RouteDbError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    #[error("invalid listen address {addr}: {message}")]
    Address { addr: String, message: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),

    #[error("estimation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Operation {
    pub async fn run(self) -> Result<(), CliError> {
        match self {
            Operation::Serve {
                data,
                estimate,
                port,
                host,
                static_dir,
                refresh_hours,
            } => {
                serve(
                    &data,
                    EstimateConfig::from(&estimate),
                    &host,
                    port,
                    &static_dir,
                    refresh_hours,
                )
                .await
            }
            Operation::Analyze {
                route,
                data,
                estimate,
                variant,
                dest,
                output,
            } => {
                analyze(
                    &data,
                    EstimateConfig::from(&estimate),
                    route,
                    variant,
                    dest,
                    &output,
                )
                .await
            }
        }
    }
}

impl DataArgs {
    async fn load_routes(&self) -> Result<RouteDbHandle, CliError> {
        let client = RouteDbClient::new(
            RouteDbClientConfig::new(&self.db_url).with_timeout(self.db_timeout_secs),
        )?;
        let cache = self
            .db_cache
            .as_ref()
            .map(|path| RouteDbCache::new(RouteDbCacheConfig::new(path)));

        let routes = RouteDbHandle::load(client, cache).await?;
        let db = routes.current().await;
        info!(
            routes = db.route_count(),
            stops = db.stop_count(),
            "loaded route database"
        );
        Ok(routes)
    }

    fn corpus(&self) -> FileCorpus {
        let corpus = FileCorpus::new(&self.times_dir);
        if !corpus.root().is_dir() {
            warn!(
                path = %corpus.root().display(),
                "timing corpus directory not found; every estimate will be absent"
            );
        }
        corpus
    }
}

fn listen_addr(host: &str, port: u16) -> Result<SocketAddr, CliError> {
    let addr = format!("{host}:{port}");
    addr.parse().map_err(|e: std::net::AddrParseError| CliError::Address {
        addr,
        message: e.to_string(),
    })
}

async fn serve(
    data: &DataArgs,
    estimate: EstimateConfig,
    host: &str,
    port: u16,
    static_dir: &Path,
    refresh_hours: u64,
) -> Result<(), CliError> {
    let addr = listen_addr(host, port)?;
    let routes = data.load_routes().await?;

    if refresh_hours > 0 {
        let refresh_routes = routes.clone();
        let period = Duration::from_secs(refresh_hours.saturating_mul(60 * 60));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // First tick is immediate, skip it
            loop {
                interval.tick().await;
                match refresh_routes.refresh().await {
                    Ok(count) => info!(routes = count, "refreshed route database"),
                    Err(e) => error!(error = %e, "failed to refresh route database"),
                }
            }
        });
    }

    let state = AppState::new(routes, data.corpus(), estimate);
    let app = create_router(state, static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| CliError::Bind { addr, source })?;
    info!(%addr, static_dir = %static_dir.display(), "route time server listening");

    axum::serve(listener, app).await.map_err(CliError::Serve)
}

async fn analyze(
    data: &DataArgs,
    estimate: EstimateConfig,
    route: String,
    variant: i64,
    dest: Option<String>,
    output: &Path,
) -> Result<(), CliError> {
    let db = data.load_routes().await?.current().await;
    let corpus = data.corpus();

    let (title, matrix) = tokio::task::spawn_blocking(move || {
        let resolved = resolve(&db, &route, variant, dest.as_deref())?;
        info!(
            title = %resolved.title,
            stops = resolved.stop_ids.len(),
            "estimating full route"
        );
        let matrix = Estimator::new(&corpus, &estimate).estimate(
            &resolved.stop_ids,
            0,
            None,
            resolved.frequency.as_ref(),
        );
        Ok::<_, ResolveError>((resolved.title, matrix))
    })
    .await??;

    if matrix.is_all_absent() {
        warn!(title = %title, "no estimates for any day or hour");
    }
    write_dashboard_data(output, &title, &matrix)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        RouteTimeApp::command().debug_assert();
    }

    #[test]
    fn serve_defaults() {
        let app = RouteTimeApp::try_parse_from(["route-time-server", "serve"]).unwrap();
        let Operation::Serve {
            data,
            estimate,
            port,
            refresh_hours,
            ..
        } = app.op
        else {
            panic!("expected serve");
        };
        assert_eq!(port, 8000);
        assert_eq!(refresh_hours, 24);
        assert_eq!(data.db_url, DEFAULT_ROUTE_DB_URL);
        assert_eq!(data.times_dir, PathBuf::from(DEFAULT_TIMES_DIR));
        assert!(data.db_cache.is_none());

        let config = EstimateConfig::from(&estimate);
        assert_eq!(config, EstimateConfig::default());
    }

    #[test]
    fn analyze_arguments() {
        let app = RouteTimeApp::try_parse_from([
            "route-time-server",
            "analyze",
            "94",
            "--variant",
            "-1",
            "--dest",
            "Lei Yue Mun",
            "--output",
            "out.js",
            "--times-dir",
            "/data/times",
        ])
        .unwrap();

        let Operation::Analyze {
            route,
            variant,
            dest,
            output,
            data,
            ..
        } = app.op
        else {
            panic!("expected analyze");
        };
        assert_eq!(route, "94");
        assert_eq!(variant, -1);
        assert_eq!(dest.as_deref(), Some("Lei Yue Mun"));
        assert_eq!(output, PathBuf::from("out.js"));
        assert_eq!(data.times_dir, PathBuf::from("/data/times"));
    }

    #[test]
    fn analyze_requires_a_route() {
        assert!(RouteTimeApp::try_parse_from(["route-time-server", "analyze"]).is_err());
    }

    #[test]
    fn corpus_is_rooted_at_times_dir() {
        let app = RouteTimeApp::try_parse_from([
            "route-time-server",
            "serve",
            "--times-dir",
            "/nonexistent/times",
        ])
        .unwrap();
        let Operation::Serve { data, .. } = app.op else {
            panic!("expected serve");
        };
        assert_eq!(data.corpus().root(), Path::new("/nonexistent/times"));
    }

    #[test]
    fn listen_addresses() {
        assert_eq!(
            listen_addr("0.0.0.0", 8000).unwrap(),
            SocketAddr::from(([0, 0, 0, 0], 8000))
        );
        assert!(matches!(
            listen_addr("not a host", 80),
            Err(CliError::Address { .. })
        ));
    }
}
