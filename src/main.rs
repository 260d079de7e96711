use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleet_node::config::AppConfig;
use fleet_node::fleet::Supervisor;
use fleet_node::proxy::probe::run_proxy_check;
use fleet_node::proxy::ProxyPool;

#[derive(Parser)]
#[command(name = "fleet-node")]
#[command(about = "Runs a fleet of signing accounts against a remote service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every proxy in the pool and report reachability
    CheckProxy,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_result = dotenv::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleet_node=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if dotenv_result.is_err() {
        tracing::debug!("no .env file found; using the process environment");
    }

    let config = AppConfig::from_env();
    tracing::info!(
        wallet_file = %config.wallet_file,
        proxy_file = %config.proxy_file,
        endpoint_url = %config.endpoint_url,
        request_timeout_secs = config.request_timeout_secs,
        "configuration loaded"
    );

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::CheckProxy) => {
            let pool = ProxyPool::new(&config);
            run_proxy_check(&pool).await?;
        }
        None => {
            let supervisor = Supervisor::new(config);
            supervisor.run().await?;
        }
    }

    tracing::info!("shutdown complete");
    Ok(())
}
