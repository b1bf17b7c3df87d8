use clap::Parser;
use log::{error, info};
use server::collaborators::Collaborators;
use server::config::{Config, DEFAULT_CONFIG_PATH};
use server::network::LogListener;
use server::requests::{http_client, LogsTfUploader, PickupApi};
use server::router::Router;
use server::store::SqliteStatsStore;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level, overrides the configured one (RUST_LOG still wins)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    let level = args.log_level.as_deref().unwrap_or(&config.server.log_level);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    info!("Starting log watcher with {}", args.config);

    let client = http_client(&config.server)?;
    let collaborators = Collaborators {
        resolver: Arc::new(PickupApi::new(client.clone(), &config.server.api_url)),
        archiver: Arc::new(LogsTfUploader::new(
            client,
            &config.server.archive_url,
            &config.server.archive_key,
        )),
        persister: Arc::new(SqliteStatsStore::open(&config.server.database)?),
    };

    let sources = config.sources()?;
    if sources.is_empty() {
        error!("No sources configured, every datagram will be dropped");
    }

    let router = Router::start(sources, collaborators);
    let listener = LogListener::bind(config.listen_addr()?).await?;

    tokio::select! {
        _ = listener.run(&router) => {}
        _ = tokio::signal::ctrl_c() => {
            info!(
                "Received Ctrl+C, shutting down ({} lines dropped)",
                router.dropped_count()
            );
        }
    }

    Ok(())
}
