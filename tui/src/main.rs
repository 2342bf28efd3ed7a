//! Dream11 Support TUI Entry Point
//!
//! Launches the terminal chat window for the Dream11 support bot.
//!
//! Usage:
//!   dream11-support-tui [OPTIONS]
//!
//! Options:
//!   --api-url <URL>       Support backend base URL (default: http://127.0.0.1:8000)
//!   --config <PATH>       Config file (default: ~/.config/dream11-support/config.toml)
//!   --send-session-id     Include the session ID in chat requests
//!
//! Logs go to `dream11-support-tui.log` in the temp directory; set
//! `RUST_LOG` to raise the level.

use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dream11_conductor::{load_config_from_path, ConfigOverrides};
use dream11_support_tui::{conductor_client::ConductorClient, App};

/// Terminal chat client for the Dream11 support bot
#[derive(Parser, Debug)]
#[command(name = "dream11-support-tui", version, about)]
struct Args {
    /// Support backend base URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Path to a TOML config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Include the session ID in chat requests
    #[arg(long)]
    send_session_id: bool,
}

const LOG_FILE: &str = "dream11-support-tui.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Log to a file; stdout belongs to the alternate screen
    let log_path = std::env::temp_dir().join(LOG_FILE);
    let log_file = std::fs::File::create(&log_path)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut config = load_config_from_path(args.config)?;
    let overrides = ConfigOverrides {
        base_url: args.api_url,
        send_session_id: args.send_session_id.then_some(true),
    };
    overrides.apply(&mut config)?;
    tracing::info!(
        endpoint = %config.api.chat_url(),
        source = ?config.source(),
        "Configuration loaded"
    );

    let client = ConductorClient::from_config(&config)?;

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: dream11-support-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  • Running in a non-interactive environment (CI, container)");
        eprintln!("  • SSH without -t flag");
        eprintln!("  • Piped stdin/stdout");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = run_app(&mut terminal, client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    // Propagate any errors
    let goodbye = result?;

    // Show goodbye message after TUI closes
    if let Some(goodbye) = goodbye {
        println!("\n\x1b[38;2;255;107;53mDream11 Support Bot:\x1b[0m {goodbye}\n");
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    client: ConductorClient,
) -> anyhow::Result<Option<String>> {
    let mut app = App::new(client)?;
    app.run(terminal).await?;
    Ok(app.goodbye().map(str::to_string))
}
