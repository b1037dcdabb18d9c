use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use tokio::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use uptime_proxy::db;
use uptime_proxy::metrics::LATENCY_PRUNE_INTERVAL_SECS;
use uptime_proxy::server::config::ServerConfig;
use uptime_proxy::upstream::fetch::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
use uptime_proxy::upstream::{HttpTransport, UptimeRobotClient};
use uptime_proxy::version::VERSION;
use uptime_proxy::web::{create_axum_router, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Override the PORT environment variable.
    #[arg(long)]
    port: Option<u16>,
}

fn init_logging() {
    // Log to a file: JSON format, daily rotation.
    let file_appender = rolling::daily("logs", "uptime-proxy.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format.
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    init_logging();
    info!("starting uptime-proxy, version: {}", VERSION);
    dotenv().ok();

    let mut config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load server configuration: {e}");
            return Err(e.into());
        }
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    let config = Arc::new(config);

    // The mirror store is optional; the proxy serves traffic without it.
    let db_pool = if config.persistence_enabled {
        match config.database_url.as_deref() {
            Some(url) => {
                let pool = db::connect(url).await?;
                db::init_database(&pool).await?;
                Some(pool)
            }
            None => {
                warn!("ENABLE_PERSISTENCE is set but DATABASE_URL is missing, mirroring disabled");
                None
            }
        }
    } else {
        None
    };

    let transport = Arc::new(HttpTransport::new(config.upstream_timeout)?);
    let upstream = UptimeRobotClient::new(
        transport,
        config.api_key.clone(),
        config.read_api_key.clone(),
        DEFAULT_RETRIES,
        DEFAULT_RETRY_DELAY,
    );
    let state = Arc::new(AppState::new(config.clone(), upstream, db_pool));

    // Keep the latency sample buffer bounded.
    {
        let state = state.clone();
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(Duration::from_secs(LATENCY_PRUNE_INTERVAL_SECS));
            ticker.tick().await; // the first tick completes immediately
            loop {
                ticker.tick().await;
                state.metrics.prune_latencies();
            }
        });
    }

    let app = create_axum_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("server listening on {addr}");
    info!("public URL: {}", config.public_url);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
