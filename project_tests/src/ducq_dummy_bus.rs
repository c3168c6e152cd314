use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use lib_ducq::loggers::setup_logging;
use lib_ducq::Level;
use project_tests::DummyBus;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(about = "Local ducq bus for trying out the monitor", version)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "DUCQ_BUS_LISTEN", default_value = "127.0.0.1:8080")]
    listen: String,

    /// Milliseconds between generated messages.
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Route the generated messages are published to.
    #[arg(long, default_value = "ticker")]
    route: String,

    #[arg(long, env = "DUCQ_LOG_DIR", default_value = "./logs")]
    log_dir: PathBuf,

    #[arg(long, env = "DUCQ_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    setup_logging(&args.log_dir, &args.log_level, "ducq_dummy_bus").context("Failed to set up logging")?;

    let bus = DummyBus::start(&args.listen).await?;
    println!("Dummy bus on ws://{}", bus.endpoint());

    let mut ticker = tokio::time::interval(Duration::from_millis(args.interval_ms.max(1)));
    let mut count: u64 = 0;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                log::info!("Ctrl-C received, initiating shutdown.");
                break;
            }
            _ = ticker.tick() => {
                count += 1;
                bus.publish(&args.route, &format!("tick {}", count));
                // Every tenth tick also exercises the other monitor levels.
                if count % 10 == 0 {
                    bus.log(Level::Warn, "tick", "dummy_bus", &args.route, "ten more ticks");
                    bus.log(Level::Debug, "stats", "dummy_bus", &args.route, &format!("published={}", count));
                }
            }
        }
    }

    bus.close_all(1001, "bus shutting down");
    tokio::time::sleep(Duration::from_millis(100)).await;
    bus.shutdown().await;
    Ok(())
}
