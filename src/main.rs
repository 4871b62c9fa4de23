use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use daily_tracker::{app::App, storage::FileStore, task_store::TaskStore, ui};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Personal daily task tracker for the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Directory holding the stored task list
    #[arg(long, env = "DAILY_TRACKER_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Log destination, used when RUST_LOG is set [default: <data-dir>/daily-tracker.log]
    #[arg(long, env = "DAILY_TRACKER_LOG_FILE")]
    log_file: Option<PathBuf>,
}

// The terminal belongs to the UI, so logs only ever go to a file.
fn init_tracing(log_file: &Path) {
    let Some(filter) = std::env::var("RUST_LOG")
        .ok()
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
    else {
        return;
    };
    let file = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to open log file {}: {}", log_file.display(), err);
            return;
        }
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| cli.data_dir.join("daily-tracker.log"));
    init_tracing(&log_file);

    let mut app = App::new(TaskStore::new(FileStore::new(&cli.data_dir)));
    tracing::info!(data_dir = %cli.data_dir.display(), tasks = app.view.len(), "starting");

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "terminal error");
        eprintln!("{:?}", err);
    }
    Ok(())
}
