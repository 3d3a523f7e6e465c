use std::fs::File;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use grove_core::{
    audio, clock, BuiltinArtSource, Config, Database, FileArtSource, QuoteSource,
    SessionOrchestrator, SoftBackend, YoutubeResolver,
};

mod app;
mod ui;

#[derive(Parser)]
#[command(name = "grove", version, about = "A bonsai that grows while you focus")]
struct Cli {
    /// Disable the daily weather overlay for this run.
    #[arg(long)]
    no_weather: bool,

    /// Start with the menu volume set to this level (0-100).
    #[arg(long)]
    volume: Option<u8>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let data_dir = grove_core::storage::data_dir()?;
    init_logging(&data_dir);

    let mut config = Config::load_or_default();
    if cli.no_weather {
        config.ui.weather_enabled = false;
    }
    if let Some(volume) = cli.volume {
        config.audio.volume = volume.min(100) as u32;
    }

    let db = Database::open()?;

    let music_dir = config
        .audio
        .music_dir
        .clone()
        .unwrap_or_else(|| data_dir.join("music"));
    let local_tracks = audio::scan_local_tracks(&music_dir);

    let art_dir = data_dir.join("art");
    let art: Box<dyn grove_core::ArtSource> = if art_dir.is_dir() {
        Box::new(FileArtSource::new(art_dir))
    } else {
        Box::new(BuiltinArtSource)
    };

    let quotes = QuoteSource::load(Some(&QuoteSource::user_file(&data_dir)));
    let resolver = Arc::new(YoutubeResolver::new()?);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        tracks = local_tracks.len(),
        "session starting"
    );

    let session = SessionOrchestrator::new(
        &config,
        db.load_age(),
        Box::new(SoftBackend),
        resolver,
        art,
        quotes,
        local_tracks,
        clock::now_ms(),
    )?;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = app::App::new(session).run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Persist the tree whether the loop ended cleanly or not.
    match result {
        Ok(age) => {
            tracing::info!(age, "session ended");
            db.save_age(age);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Logs go to a file: the terminal belongs to the UI.
fn init_logging(data_dir: &std::path::Path) {
    let Ok(file) = File::create(data_dir.join("grove.log")) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}
