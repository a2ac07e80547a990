use std::{fs::OpenOptions, path::PathBuf, sync::Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use app::App;
use config::Config;
use navigator::{LogNavigator, Navigator, SystemNavigator};

mod app;
mod config;
mod history;
mod navigator;

#[derive(Parser, Debug)]
#[command(name = "navhist")]
#[command(about = "Browse, rewind and prune a session's navigation history")]
struct Args {
    /// Addresses to record on startup, after the config's `start` list
    addresses: Vec<String>,

    /// Config file (defaults to navhist.toml in the working directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log navigations instead of opening them with the system handler
    #[arg(long = "no-open", default_value_t = false)]
    no_open: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::discover(args.config.as_deref())?;
    init_logging(&config)?;
    info!(?config, "Starting");

    let navigator: Box<dyn Navigator> = if config.open_externally && !args.no_open {
        Box::new(SystemNavigator)
    } else {
        Box::new(LogNavigator)
    };
    let mut app = App::new(navigator);
    app.preload(config.start.iter().chain(&args.addresses));

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(config: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("Opening log file {}", config.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(config.level()?)
        .init();
    Ok(())
}
