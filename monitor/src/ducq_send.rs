use anyhow::{Context, Result};
use clap::Parser;
use lib_ducq::configs::{load_config_from, ConfigArgs};
use lib_ducq::loggers::setup_logging;
use lib_ducq::session::{Endpoint, Greeting, SessionSupervisor, WsConnector};
use lib_ducq::{MessageView, Projection, Snapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

mod control;
use control::{parse_control, Control};

const APP_NAME: &str = "ducq_send";

#[derive(Parser, Debug)]
#[command(about = "Quick ducq client driven by stdin control lines", version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Open the session right away instead of waiting for `send`.
    #[arg(long)]
    now: bool,
}

fn print_latest(snapshot: &Snapshot) {
    if let Some(frame) = snapshot.last() {
        let record = MessageView.classify(frame);
        println!("< [{}] {} {}", record.level, record.command, record.route);
        if !record.payload.is_empty() {
            println!("{}", record.payload);
        }
    }
}

/// Applies one control line. Returns `false` on `quit`.
fn apply(supervisor: &mut SessionSupervisor<WsConnector>, control: Control) -> Result<bool> {
    let greeting = supervisor.greeting().clone();
    let endpoint = supervisor.endpoint().clone();

    match control {
        Control::Command(command) => supervisor.set_greeting(Greeting { command, ..greeting }),
        Control::Route(route) => supervisor.set_greeting(Greeting { route, ..greeting }),
        Control::Payload(payload) => supervisor.set_greeting(Greeting { payload, ..greeting }),
        Control::Host(host) => {
            if supervisor.set_endpoint(Endpoint { host, ..endpoint })? {
                println!("* reconnecting to {}", supervisor.endpoint());
            }
        }
        Control::Port(port) => {
            if supervisor.set_endpoint(Endpoint { port, ..endpoint })? {
                println!("* reconnecting to {}", supervisor.endpoint());
            }
        }
        Control::Send => {
            supervisor.set_active(true)?;
            println!("* {} on {}", supervisor.greeting().caption(), supervisor.endpoint());
        }
        Control::Close => {
            supervisor.set_active(false)?;
            println!("* closed");
        }
        Control::Quit => return Ok(false),
    }
    Ok(true)
}

async fn run(mut supervisor: SessionSupervisor<WsConnector>, open_now: bool) -> Result<()> {
    if open_now {
        supervisor.set_active(true)?;
    }
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                log::info!("Ctrl-C received.");
                break;
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    // Keep listening after piped input until Ctrl-C.
                    log::info!("stdin closed.");
                    if !supervisor.is_active() {
                        break;
                    }
                    stdin_open = false;
                    continue;
                };
                match parse_control(&line) {
                    Ok(Some(control)) => match apply(&mut supervisor, control) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => eprintln!("! {:#}", e),
                    },
                    Ok(None) => {}
                    Err(e) => eprintln!("! {:#}", e),
                }
            }
            snapshot = supervisor.next_change() => print_latest(&snapshot),
        }
    }

    supervisor.set_active(false)?;
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config_from(cli.config).context("Failed to load configuration")?;
    setup_logging(&config.log_dir, &config.log_level, APP_NAME).context("Failed to set up logging")?;

    let supervisor = SessionSupervisor::new(WsConnector, config.endpoint, config.greeting)
        .with_capacity(config.max_messages);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build the tokio runtime")?;
    runtime.block_on(run(supervisor, cli.now))
}
