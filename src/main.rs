use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use memorial_grid::{api, check_startup, OutputFormat, PinningCredentials, ServiceConfig};

/// Engager lookup and memorial image backend
#[derive(Debug, Parser)]
#[command(name = "memorial-grid", version, about)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
    bind: String,

    /// Tokio worker threads (defaults to the number of CPUs)
    #[arg(long, env = "WORKERS")]
    workers: Option<usize>,

    /// Per-tile fetch timeout in milliseconds
    #[arg(long, env = "TILE_FETCH_TIMEOUT_MS", default_value_t = 10_000)]
    tile_timeout_ms: u64,

    /// Largest accepted profile picture in bytes
    #[arg(long, env = "MAX_TILE_BYTES", default_value_t = memorial_grid::tiles::MAX_TILE_BYTES)]
    max_tile_bytes: u64,

    /// Simulated latency of the engager lookup in milliseconds
    #[arg(long, env = "LOOKUP_DELAY_MS", default_value_t = 1_000)]
    lookup_delay_ms: u64,

    /// Encoding of the composed image
    #[arg(long, env = "OUTPUT_FORMAT", value_enum, default_value_t = OutputFormat::Png)]
    format: OutputFormat,

    #[arg(long, env = "PINATA_API_BASE", default_value = "https://api.pinata.cloud")]
    pinning_api: String,

    #[arg(long, env = "IPFS_GATEWAY", default_value = "https://gateway.pinata.cloud/ipfs")]
    gateway: String,

    #[arg(long, env = "PINATA_JWT", hide_env_values = true)]
    pinata_jwt: Option<String>,

    #[arg(long, env = "PINATA_API_KEY", hide_env_values = true)]
    pinata_api_key: Option<String>,

    #[arg(long, env = "PINATA_SECRET_API_KEY", hide_env_values = true)]
    pinata_secret_api_key: Option<String>,
}

impl Cli {
    fn credentials(&self) -> Option<PinningCredentials> {
        if let Some(jwt) = &self.pinata_jwt {
            return Some(PinningCredentials::Jwt(jwt.clone()));
        }
        match (&self.pinata_api_key, &self.pinata_secret_api_key) {
            (Some(key), Some(secret)) => Some(PinningCredentials::ApiKey {
                key: key.clone(),
                secret: secret.clone(),
            }),
            _ => None,
        }
    }

    fn into_config(self) -> ServiceConfig {
        ServiceConfig {
            credentials: self.credentials(),
            bind_addr: self.bind,
            tile_fetch_timeout_ms: self.tile_timeout_ms,
            max_tile_bytes: self.max_tile_bytes,
            lookup_delay_ms: self.lookup_delay_ms,
            output_format: self.format,
            pinning_api_base: self.pinning_api,
            gateway_base: self.gateway,
            ..Default::default()
        }
    }
}

async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr.clone();
    let state = api::AppState::from_config(config)?;
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("listening on {}", bind_addr);
    axum::serve(listener, api::router(state)).await?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let workers = cli.workers.unwrap_or_else(num_cpus::get).max(1);
    let config = cli.into_config();

    if let Some(warning) = check_startup(&config) {
        warn!("{}", warning);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(serve(config))
}
