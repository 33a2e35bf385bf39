use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use carevoice_server::{create_app, RelayServer, ServerConfig};
use voice_relay_service::{RelayConfig, RelayPipeline};

/// CareVoice Relay HTTP Server
#[derive(Parser, Debug)]
#[command(name = "carevoice-server")]
#[command(about = "Voice assistant relay backend for SMART-on-FHIR patient apps")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(args.verbose);

    info!("Starting CareVoice Relay HTTP Server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let relay_config = RelayConfig::from_env().context("invalid relay configuration")?;
    let pipeline =
        RelayPipeline::new(relay_config).context("failed to initialize relay pipeline")?;
    let server = RelayServer::new(ServerConfig::default(), pipeline);

    let app = create_app(server);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!("CareVoice Relay server running on http://{addr}");
    info!("Health check available at: http://{addr}/health");

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("carevoice_server={level},voice_relay_service={level},tower_http=info,reqwest=info")
            .into()
    });

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
