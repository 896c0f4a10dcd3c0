use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod controller;
mod error;
mod generation;
mod handler;
mod output;
mod prompt;
mod responder;
mod storage;
mod theme;
mod transcript;
mod tui;
mod ui;

use app::App;
use config::Settings;
use controller::ChatController;
use generation::Model;
use output::SystemClipboard;
use responder::EchoResponder;
use storage::{FileStore, KeyValueStore};
use theme::ThemeStore;

#[derive(Parser)]
#[command(name = "playground")]
#[command(about = "Chat playground with tunable generation parameters and a simulated responder")]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Delay before the simulated response arrives, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Directory where chat.json is written
    #[arg(long)]
    export_dir: Option<PathBuf>,
    /// Key-value file holding the theme preference
    #[arg(long)]
    storage: Option<PathBuf>,
    /// Log filter, e.g. "debug" (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,
    /// Initial model: gpt-3.5, gpt-4, mistral or custom
    #[arg(long, value_parser = parse_model)]
    model: Option<Model>,
}

fn parse_model(s: &str) -> Result<Model, String> {
    Model::from_str(s).ok_or_else(|| {
        let known: Vec<&str> = Model::all().iter().map(|m| m.as_str()).collect();
        format!("unknown model '{}', expected one of: {}", s, known.join(", "))
    })
}

fn open_log_file() -> Result<fs::File> {
    let log_path = Settings::log_path()?;
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::OpenOptions::new().create(true).append(true).open(&log_path)?)
}

/// Logs go to a file because the terminal UI owns stderr. When the file
/// cannot be opened, logging is discarded rather than stopping startup.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);

    match open_log_file() {
        Ok(log_file) => builder.with_writer(Arc::new(log_file)).init(),
        Err(_) => builder.with_writer(io::sink).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut settings, settings_error) = Settings::load_or_default(cli.config.as_deref());
    if let Some(delay) = cli.delay_ms {
        settings.response_delay_ms = delay;
    }
    if let Some(dir) = cli.export_dir {
        settings.export_dir = Some(dir);
    }
    if let Some(path) = cli.storage {
        settings.storage_path = Some(path);
    }
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }

    init_logging(&settings.log_level);
    if let Some(err) = settings_error {
        warn!("using default settings: {err:#}");
    }

    let storage_path = settings.storage_path().unwrap_or_else(|err| {
        warn!("no config directory, keeping preferences in the working directory: {err:#}");
        PathBuf::from("storage.json")
    });
    let storage = FileStore::new(storage_path);
    info!(
        delay_ms = settings.response_delay_ms,
        storage = %storage.path().display(),
        export_dir = %settings.export_dir().display(),
        "starting playground"
    );

    let storage: Box<dyn KeyValueStore> = Box::new(storage);
    let session = ChatController::new(Arc::new(EchoResponder), settings.response_delay());
    let mut app = App::new(
        session,
        ThemeStore::initialize(storage),
        Box::new(SystemClipboard),
        settings.export_dir(),
    );
    if let Some(model) = cli.model {
        app.config.set_model(model);
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    // Dropping the app aborts any response still in flight
    drop(app);
    info!("playground exited");
    result
}

enum Step {
    Event(Option<tui::AppEvent>),
    Resolved,
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let pending = app.session.is_pending();
        let step = tokio::select! {
            event = events.next() => Step::Event(event),
            _ = app.session.wait_resolution(), if pending => Step::Resolved,
        };

        match step {
            Step::Event(Some(event)) => handler::handle_event(app, event),
            Step::Event(None) => break,
            Step::Resolved => app.on_resolution(),
        }
    }

    Ok(())
}
