use arithmo_mcp_server::{Calculator, ServerConfig, server};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Runs on the actix system runtime; the stdio transport is served from the
/// same runtime.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    // stdout belongs to the stdio transport, so logs always go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".to_string().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();

    let calculator = Calculator::new(config.presentation);
    server::run(calculator, &config).await
}
