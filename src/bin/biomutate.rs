use biomutate::config::Config;
use biomutate::errors;
use biomutate::services::{ServerClient, ServerEvent};
use biomutate::tui::{App, PageKind};
use clap::{Parser, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use crossterm::event::{EnableBracketedPaste, EnableMouseCapture, EventStream};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, enable_raw_mode};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing::{error, info};

/// Redraw and animation interval
const TICK_RATE: Duration = Duration::from_millis(50);

/// Terminal client for the BioMutate table viewer and missense tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Base URL of the BioMutate server (overrides the config file)
    #[arg(long = "server", value_name = "URL")]
    server: Option<String>,
    /// Page to open on start
    #[arg(long = "page", value_enum, default_value_t = PageKind::Home)]
    page: PageKind,
    /// Directory for downloaded workbooks (overrides the config file)
    #[arg(long = "download-dir", value_name = "DIR")]
    download_dir: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    errors::init()?;
    let args = Args::parse();
    biomutate::logging::init_with(None, args.logging.map(Into::into))?;

    let mut config = Config::from_path(args.config.as_deref()).wrap_err("failed to load config")?;
    if let Some(server) = args.server {
        config.server_url = server;
    }
    if let Some(dir) = args.download_dir {
        config.download_dir = Some(dir);
    }
    let client = Arc::new(
        ServerClient::new(&config.server_url).wrap_err("failed to create the HTTP client")?,
    );
    info!(server = %client.base_url(), "starting");

    let (tx, rx) = unbounded_channel();
    let mut app = App::new(config, client.clone(), client, tx, args.page);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // App loop
    let res = run_app(&mut terminal, &mut app, rx).await;

    // Restore terminal
    errors::restore_terminal();
    terminal.show_cursor()?;
    if let Err(e) = &res {
        error!("Error: {e}");
    }
    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut server_events: UnboundedReceiver<ServerEvent>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_RATE);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    while !app.should_quit() {
        terminal.draw(|f| app.render(f))?;

        tokio::select! {
            _ = ticker.tick() => app.tick(Instant::now())?,
            Some(event) = server_events.recv() => {
                app.handle_server_event(event, Instant::now())?;
            }
            event = events.next() => match event {
                Some(Ok(event)) => app.handle_event(event, Instant::now())?,
                Some(Err(e)) => return Err(e).wrap_err("failed to read terminal events"),
                None => break,
            },
        }
    }
    Ok(())
}
