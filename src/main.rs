use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::{Handle, Runtime};
use tracing::info;

use hostwatch::chart::NoTargets;
use hostwatch::config::{Overrides, Settings};
use hostwatch::data::export::export_to_file;
use hostwatch::{events, logging, ui};
use hostwatch::{App, Dashboard, DataSource, FileSource, HttpSource, TerminalCharts};

#[derive(Parser, Debug)]
#[command(name = "hostwatch")]
#[command(version)]
#[command(about = "Terminal dashboard for fleet network health")]
struct Args {
    /// Settings file (TOML). Defaults to hostwatch.toml when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Metrics endpoint of the monitoring backend
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Replay a snapshot JSON file instead of polling the endpoint
    #[arg(short, long, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Refresh period (e.g., "5s", "500ms")
    #[arg(short, long)]
    refresh: Option<String>,

    /// Number of points kept in the fleet latency trend
    #[arg(short, long)]
    window: Option<usize>,

    /// Fetch once, export summary and hosts to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Where to write logs
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.url.clone(),
            file: self.file.clone(),
            refresh: self.refresh.clone(),
            window_capacity: self.window,
            log_file: self.log_file.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration errors are reported before the terminal is touched
    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;
    logging::init(&settings.log_file, &settings.log_filter)?;

    // Background fetches run here while the UI owns the main thread
    let runtime = Runtime::new()?;
    let source = build_source(&settings, runtime.handle().clone())?;

    if let Some(ref export_path) = args.export {
        return export_once(source, &settings, export_path);
    }

    run_tui(source, &settings)
}

fn build_source(settings: &Settings, runtime: Handle) -> Result<Box<dyn DataSource>> {
    if let Some(ref path) = settings.file {
        return Ok(Box::new(FileSource::new(path)));
    }
    let source = HttpSource::new(&settings.endpoint, settings.fetch_timeout, runtime)?;
    Ok(Box::new(source))
}

/// Fetch one snapshot and write it out without starting the TUI
fn export_once(source: Box<dyn DataSource>, settings: &Settings, path: &Path) -> Result<()> {
    let mut dashboard =
        Dashboard::new(source, settings.dashboard_options(), TerminalCharts::new());
    let deadline = Instant::now() + settings.fetch_timeout + Duration::from_secs(1);

    loop {
        dashboard.tick(Instant::now(), &NoTargets);
        if let Some(summary) = dashboard.summary() {
            export_to_file(path, summary, dashboard.snapshot(), dashboard.window())?;
            println!("Exported fleet state to: {}", path.display());
            return Ok(());
        }
        if let Some(err) = dashboard.last_error() {
            bail!("Failed to fetch snapshot from {}: {}", dashboard.source_description(), err);
        }
        if Instant::now() >= deadline {
            bail!("Timed out waiting for {}", dashboard.source_description());
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, settings: &Settings) -> Result<()> {
    let dashboard = Dashboard::new(source, settings.dashboard_options(), TerminalCharts::new());
    let mut app = App::new(dashboard);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app);
    app.dashboard.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("terminal restored");
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // First tick issues the initial fetch
    app.tick(Instant::now());

    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Panels laid out by this frame may unblock skipped hosts
        app.after_draw();

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key)
                }
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                // Terminal will redraw on next iteration
                _ => {}
            }
        }

        app.tick(Instant::now());
    }

    Ok(())
}
