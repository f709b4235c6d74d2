//! Bingo Draw Server Binary

use bingo_draw::api::ApiServer;
use bingo_draw::config::ConfigLoader;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bingo-draw")]
#[command(about = "Scheduled bingo draw server", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Server host (overrides config and BINGO_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config and PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Seconds per countdown minute, for demos
    #[arg(long)]
    countdown_tick_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(tick) = args.countdown_tick_secs {
        if tick == 0 {
            return Err("--countdown-tick-secs must be greater than zero".into());
        }
        config.timing.countdown_tick_secs = tick;
    }

    let server = ApiServer::new(config)?;
    server.run().await?;

    Ok(())
}
