use clap::Parser;
use shunt_dns_domain::config::CliOverrides;
use shunt_dns_infrastructure::dns::Relay;
use tracing::info;

mod bootstrap;

#[derive(Parser)]
#[command(name = "shunt-dns")]
#[command(version)]
#[command(about = "Classifying DNS relay with filtered resolution for block-evasion domains")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Listening port (DNS standard is 53)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Upstream resolver URL (udp://host:port or tcp://host:port)
    #[arg(short = 'u', long)]
    upstream: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        port: cli.port,
        bind_address: cli.bind.clone(),
        upstream_url: cli.upstream.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config);

    info!("Starting shunt-dns v{}", env!("CARGO_PKG_VERSION"));
    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        port = config.server.port,
        bind = %config.server.bind_address,
        upstream = %config.upstream.url,
        blocked_suffixes = config.blocking.suffixes.len(),
        "Configuration loaded"
    );

    let relay = Relay::start(&config).await?;
    relay.wait().await?;

    info!("Relay shutdown complete");
    Ok(())
}
