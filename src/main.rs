//! Extra Memory - a terminal client for the Extra Memory bookmarking service.
//!
//! Save notes, links, videos, images and audio with tags, browse them by
//! category, and share the whole collection through a public link.

mod api;
mod app;
mod config;
mod error;
mod events;
mod logging;
mod tasks;
mod ui;
mod validation;

use std::io::{self, Stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api::AuthContext;
use crate::app::App;
use crate::config::Config;
use crate::events::EventHandler;
use crate::tasks::{create_task_channel, ApiMessage};

/// Terminal client for Extra Memory.
#[derive(Debug, Parser)]
#[command(name = "extramem", version, about)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend origin, overriding the config file
    #[arg(long, global = true, value_name = "URL")]
    backend: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Browse someone's shared brain (read-only)
    Shared {
        /// The owner's user ID, as found at the end of a share link
        user_id: String,
    },
    /// Forget the stored session token
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, fresh_path) = load_config(&cli)?;

    if let Err(e) = logging::init(config.settings.log_filter.as_deref()) {
        eprintln!("Warning: logging disabled: {e:#}");
    }
    logging::log_session(&config);

    if let Some(path) = fresh_path {
        match Config::default().save_to(&path) {
            Ok(()) => info!(path = %path.display(), "Wrote default config"),
            Err(e) => warn!("Could not write default config: {}", e),
        }
    }

    let result = run(cli.command, config).await;
    logging::shutdown();
    result
}

async fn run(command: Option<Command>, config: Config) -> Result<()> {
    match command {
        Some(Command::Logout) => {
            AuthContext::keyring(&config.backend_url)
                .clear()
                .context("Failed to clear stored token")?;
            info!(backend = %config.backend_url, "Signed out from the command line");
            println!("Signed out of {}", config.backend_url);
            Ok(())
        }
        Some(Command::Shared { user_id }) => run_tui(config, Some(user_id)),
        None => run_tui(config, None),
    }
}

/// Load the config file and apply command-line overrides.
///
/// Also returns the default config path when no file exists there yet, so
/// the defaults can be written out once logging is up.
fn load_config(cli: &Cli) -> Result<(Config, Option<PathBuf>)> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let fresh = !path.exists() && cli.config.is_none();
    let mut config = Config::load_from(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    if let Some(backend) = &cli.backend {
        config = config
            .with_backend_url(backend.as_str())
            .context("Invalid --backend URL")?;
    }
    Ok((config, fresh.then_some(path)))
}

fn run_tui(config: Config, shared_user: Option<String>) -> Result<()> {
    let (width, _) = crossterm::terminal::size().context("Failed to read terminal size")?;
    let events = EventHandler::with_tick_rate(config.settings.tick_rate_ms);
    let auth = AuthContext::keyring(&config.backend_url);
    let (rx, spawner) = create_task_channel();

    let mut app = App::new(config, auth, spawner, width)?;
    match shared_user {
        Some(user_id) => app.open_shared(user_id),
        None => app.start(),
    }

    install_panic_hook();
    let mut terminal = init_terminal()?;
    let result = run_loop(&mut terminal, &mut app, &events, rx);
    restore_terminal(&mut terminal)?;
    result
}

/// Initialize the terminal for TUI mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restore the terminal to normal mode.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Leave the alternate screen before the panic message is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Main event loop: draw, drain finished tasks, then wait for input or a tick.
fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    events: &EventHandler,
    mut rx: mpsc::UnboundedReceiver<ApiMessage>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.view(frame))?;

        while let Ok(message) = rx.try_recv() {
            app.handle_api_message(message);
        }

        let event = events.next().context("Failed to read terminal event")?;
        app.update(event);

        if app.should_quit() {
            info!("Exiting main loop");
            break;
        }
    }
    Ok(())
}
