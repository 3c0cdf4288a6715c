use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use latwatch::{events, ui, App, ExportReport, LatencySource, LiveFeed, Settings, SimulatedSource};

/// How often the UI redraws and checks for input.
const TICK: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "latwatch")]
#[command(about = "Live latency map between exchange co-location sites and cloud regions")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generation interval (e.g., "7s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Number of readings kept for trend charts
    #[arg(long)]
    history: Option<usize>,

    /// Seed for reproducible readings
    #[arg(long)]
    seed: Option<u64>,

    /// Run a few cycles, write a JSON report to this path and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Cycles to run before exporting
    #[arg(long, default_value = "1", requires = "export")]
    cycles: u32,

    /// Write logs to this file (the TUI otherwise runs without logging)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.export.is_none())?;

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(interval) = args.interval.clone() {
        settings.feed.interval = interval;
    }
    if let Some(history) = args.history {
        settings.feed.history_capacity = history;
    }
    if args.seed.is_some() {
        settings.feed.seed = args.seed;
    }

    let topology = Arc::new(settings.topology()?);
    let feed_config = settings.feed_config()?;
    let time_range = settings.time_range()?;

    let source: Box<dyn LatencySource> = match settings.feed.seed {
        Some(seed) => Box::new(SimulatedSource::seeded(seed)),
        None => Box::new(SimulatedSource::new()),
    };
    info!(
        exchanges = topology.exchanges().len(),
        regions = topology.regions().len(),
        source = source.description(),
        "Topology ready"
    );

    let feed = LiveFeed::new(topology, source, feed_config)?;

    if let Some(export_path) = args.export {
        return export_to_file(&feed, &export_path, args.cycles, time_range);
    }

    run_tui(feed, time_range)
}

/// Install the tracing subscriber.
///
/// Logs go to `log_file` when given. Without one, interactive mode stays
/// silent so log lines don't corrupt the terminal, and export mode logs to
/// stderr.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "latwatch=info".into());

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None if !interactive => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(io::stderr))
                .init();
        }
        None => {}
    }
    Ok(())
}

/// Run cycles synchronously and write a report.
fn export_to_file(
    feed: &LiveFeed,
    export_path: &Path,
    cycles: u32,
    time_range: latwatch::TimeRange,
) -> Result<()> {
    for cycle in 1..=cycles {
        if let Err(e) = feed.refresh_now() {
            warn!(cycle, error = %e, "Cycle failed");
        }
    }

    ExportReport::capture(feed, time_range).write_to(export_path)?;
    println!("Exported latency report to: {}", export_path.display());
    Ok(())
}

/// Start the feed on a background runtime and run the TUI on this thread.
fn run_tui(feed: LiveFeed, time_range: latwatch::TimeRange) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let handle = {
        let _guard = rt.enter();
        feed.start()?
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal if anything panics
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(feed, time_range);
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    rt.block_on(handle.shutdown());
    info!(cycles = app.status.cycles, "Exiting");

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.poll_feed();
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(TICK)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    events::handle_mouse_event(app, mouse, ui::CONTENT_START_ROW)
                }
                _ => {}
            }
        }
    }

    Ok(())
}
