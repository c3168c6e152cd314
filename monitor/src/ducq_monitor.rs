use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use lib_ducq::configs::{load_config_from, ClientConfig, ConfigArgs};
use lib_ducq::loggers::setup_logging;
use lib_ducq::render::TableRenderer;
use lib_ducq::session::endpoint::MONITOR_ROUTE;
use lib_ducq::session::{Greeting, SessionSupervisor, WsConnector};
use lib_ducq::{MessageView, MonitorView, Projection, Snapshot};
use tokio::signal;

const APP_NAME: &str = "ducq_monitor";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Parser, Debug)]
#[command(about = "Live two-panel dashboard for a ducq bus", version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Print every update as one JSON line instead of drawing tables.
    #[arg(long)]
    json: bool,

    /// Table width in characters.
    #[arg(long, env = "DUCQ_WIDTH", default_value_t = 120)]
    width: usize,

    /// Disable ANSI colours.
    #[arg(long)]
    no_color: bool,
}

/// One projection bound to its own session.
struct Panel<P: Projection> {
    view: P,
    supervisor: SessionSupervisor<WsConnector>,
}

impl<P: Projection> Panel<P> {
    fn new(view: P, config: &ClientConfig, greeting: Greeting) -> Self {
        let supervisor = SessionSupervisor::new(WsConnector, config.endpoint.clone(), greeting)
            .with_capacity(config.max_messages);
        Self { view, supervisor }
    }

    fn caption(&self) -> String {
        self.supervisor.greeting().caption()
    }

    fn draw<W: Write>(&self, out: &mut W, renderer: &TableRenderer) -> io::Result<()> {
        let grid = self.view.grid(&self.supervisor.snapshot());
        renderer.render(out, &self.caption(), &grid)
    }

    fn json_line(&self, snapshot: &Snapshot) -> Result<String> {
        let line = serde_json::json!({
            "panel": self.view.name(),
            "caption": self.caption(),
            "endpoint": self.supervisor.endpoint().to_string(),
            "rows": self.view.project(snapshot),
        });
        Ok(serde_json::to_string(&line)?)
    }
}

/// Same command and payload as `greeting`, aimed at the bus log route.
fn monitor_greeting(greeting: &Greeting) -> Greeting {
    Greeting::new(greeting.command.clone(), MONITOR_ROUTE, greeting.payload.clone())
}

struct Dashboard {
    monitor: Panel<MonitorView>,
    messages: Panel<MessageView>,
    renderer: TableRenderer,
    json: bool,
}

impl Dashboard {
    fn redraw(&self) -> Result<()> {
        let mut out = io::stdout().lock();
        write!(out, "{}", CLEAR_SCREEN)?;
        self.monitor.draw(&mut out, &self.renderer)?;
        writeln!(out)?;
        self.messages.draw(&mut out, &self.renderer)?;
        out.flush()?;
        Ok(())
    }

    fn print_json(line: String) -> Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }

    async fn run(&mut self) -> Result<()> {
        self.monitor.supervisor.set_active(true).context("Failed to open the monitor session")?;
        self.messages.supervisor.set_active(true).context("Failed to open the message session")?;
        if !self.json {
            self.redraw()?;
        }

        let ctrl_c = signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    log::info!("Ctrl-C received, closing sessions.");
                    break;
                }
                snapshot = self.monitor.supervisor.next_change() => {
                    if self.json {
                        Self::print_json(self.monitor.json_line(&snapshot)?)?;
                    } else {
                        self.redraw()?;
                    }
                }
                snapshot = self.messages.supervisor.next_change() => {
                    if self.json {
                        Self::print_json(self.messages.json_line(&snapshot)?)?;
                    } else {
                        self.redraw()?;
                    }
                }
            }
        }

        self.monitor.supervisor.set_active(false)?;
        self.messages.supervisor.set_active(false)?;
        Ok(())
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config_from(cli.config).context("Failed to load configuration")?;
    let log_path = setup_logging(&config.log_dir, &config.log_level, APP_NAME).context("Failed to set up logging")?;
    log::info!("{} logging to {}", APP_NAME, log_path.display());
    log::info!("Watching {} (max {} frames per panel)", config.endpoint, config.max_messages);

    let mut dashboard = Dashboard {
        monitor: Panel::new(MonitorView, &config, monitor_greeting(&config.greeting)),
        messages: Panel::new(MessageView, &config, config.greeting.clone()),
        renderer: TableRenderer::new(cli.width, !cli.no_color),
        json: cli.json,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build the tokio runtime")?;
    runtime.block_on(dashboard.run())?;

    log::info!("Shutdown complete.");
    Ok(())
}
