//! `theme-server` -- serves tenant themes from a directory of token files.
//!
//! Every flag has an environment fallback, e.g. `THEMEKIT_TOKENS_DIR`.
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use themekit_server::{NetworkConfig, NetworkModule};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "theme-server", version, about = "Per-tenant CSS theme server")]
struct Args {
    /// Bind address.
    #[arg(long, env = "THEMEKIT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port; 0 picks a free port.
    #[arg(long, env = "THEMEKIT_PORT", default_value_t = 3000)]
    port: u16,

    /// Directory holding `<tenant>.tokens.json` files.
    #[arg(long, env = "THEMEKIT_TOKENS_DIR", default_value = "tokens")]
    tokens_dir: PathBuf,

    /// Allowed CORS origins, comma separated. `*` allows any origin.
    #[arg(long, env = "THEMEKIT_CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    cors_origins: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "THEMEKIT_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    /// Load tokens and derive CSS in middleware, before handlers run.
    #[arg(long, env = "THEMEKIT_PREWARM")]
    prewarm: bool,

    /// Emit logs as JSON lines.
    #[arg(long, env = "THEMEKIT_LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            tokens_dir: self.tokens_dir.clone(),
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            prewarm_theme: self.prewarm,
            ..NetworkConfig::default()
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let config = args.network_config();
    if !config.tokens_dir.is_dir() {
        tracing::warn!(
            "Tokens directory {} does not exist; every theme request will fail",
            config.tokens_dir.display()
        );
    }

    let mut module = NetworkModule::new(config);
    let port = module.start().await?;
    info!(port, "theme-server listening");

    module.serve(shutdown_signal()).await
}
