use clap::Parser;
use client::replay::Replayer;
use log::info;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded log file to replay
    #[arg(short, long)]
    log: String,

    /// Local address to send from; must match a configured source
    #[arg(short, long, default_value = "127.0.0.1:27150")]
    from: SocketAddr,

    /// Watcher address
    #[arg(short, long, default_value = "127.0.0.1:27100")]
    to: SocketAddr,

    /// Pause between lines in milliseconds
    #[arg(short, long, default_value = "50")]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Replaying {}", args.log);
    let replayer = Replayer::bind(args.from, args.to, Duration::from_millis(args.interval_ms)).await?;
    replayer.replay_file(&args.log).await?;

    Ok(())
}
