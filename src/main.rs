use std::io;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info, Subscriber};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use autoservice::{
    cli::{self, Cli, Commands},
    config::Config,
    fixtures::FixtureSet,
    tui::App,
    AppContext,
};

const LOG_FILE: &str = "autoservice.log";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "autoservice=info");
    }

    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    log_subscriber(interactive, Path::new(".")).init();

    let config = Config::from_env()?.with_fixtures(cli.fixtures.clone());
    config.validate()?;

    match cli.command {
        None | Some(Commands::Tui) => {
            if let Err(e) = run_tui(config).await {
                error!("TUI error: {}", e);
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(command) => {
            let data = FixtureSet::load(config.fixtures_path.as_deref())?;
            let mut stdout = io::stdout().lock();
            if let Err(e) = cli::execute(&command, &data, config.page_size, &mut stdout) {
                error!("Command failed: {}", e);
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// The terminal UI logs to the file only so nothing draws over the screen
fn log_subscriber(interactive: bool, log_dir: &Path) -> impl Subscriber + Send + Sync + 'static {
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let stderr_layer = (!interactive).then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
}

async fn run_tui(config: Config) -> Result<()> {
    info!("Starting AutoService admin console...");
    let ctx = AppContext::init(config).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(ctx);
    let res = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("AutoService admin console shut down");
    res
}
