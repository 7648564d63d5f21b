use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod extract;
mod model;
mod payload;
mod pipeline;
mod preprocessing;
mod recognition;
mod server;
mod zone;

#[derive(Parser, Debug)]
#[command(name = "identity-ocr-server")]
#[command(about = "OCR preparation and field-extraction server for identity documents")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "IDOCR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "IDOCR_PORT", default_value = "3000")]
    pub port: u16,

    /// Maximum upload size in bytes (default: 10MB)
    #[arg(long, env = "IDOCR_MAX_UPLOAD_SIZE", default_value = "10485760")]
    pub max_upload_size: usize,

    /// Base URL of the text-recognition service
    #[arg(
        long,
        env = "RECOGNITION_ENDPOINT",
        default_value = "https://vision.googleapis.com"
    )]
    pub recognition_endpoint: String,

    /// API key for the text-recognition service
    #[arg(long, env = "RECOGNITION_API_KEY", default_value = "")]
    pub recognition_api_key: String,

    /// Timeout for recognition calls, in seconds
    #[arg(long, env = "RECOGNITION_TIMEOUT_SECS", default_value = "30")]
    pub recognition_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from(args);

    tracing::info!(
        "Starting identity-ocr-server v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Binding to {}:{}", config.host, config.port);

    server::run(config).await
}
