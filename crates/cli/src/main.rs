mod settings;
mod shutdown;

use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};

use clap::Parser;

use blurwal_core::desktop::domain::background::Background;
use blurwal_core::desktop::domain::notifier::Notifier;
use blurwal_core::desktop::domain::original_wallpaper::{OriginalWallpaper, StartupAction};
use blurwal_core::desktop::infrastructure::feh_background::FehBackground;
use blurwal_core::desktop::infrastructure::notify_send_notifier::NotifySendNotifier;
use blurwal_core::desktop::infrastructure::xprop_event_source::XpropEventSource;
use blurwal_core::desktop::infrastructure::xprop_window_counter::XpropWindowCounter;
use blurwal_core::frames::domain::frame_generator::FrameGenerator;
use blurwal_core::frames::domain::frame_store::FrameStore;
use blurwal_core::frames::infrastructure::renderer_factory::{create_renderer, RendererKind};
use blurwal_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use blurwal_core::pipeline::prepare_frames_use_case::PrepareFramesUseCase;
use blurwal_core::pipeline::watch_windows_use_case::WatchWindowsUseCase;
use blurwal_core::shared::blur_config::BlurConfig;
use blurwal_core::shared::paths::Paths;
use blurwal_core::transition::domain::blur_coordinator::BlurCoordinator;

use settings::Settings;
use shutdown::{Cleanup, SignalGuard};

type CliError = Box<dyn std::error::Error + Send + Sync>;

/// Smoothly blur the wallpaper when windows are opened.
#[derive(Parser, Debug)]
#[command(name = "blurwal", version)]
struct Cli {
    /// Minimum number of windows on the workspace to blur the wallpaper.
    #[arg(short, long)]
    min: Option<usize>,

    /// Number of steps in a transition (at least 2).
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(2..))]
    steps: Option<u32>,

    /// Blur strength (sigma) of the fully blurred wallpaper.
    #[arg(short, long)]
    blur: Option<f64>,

    /// Window classes to ignore when counting windows.
    #[arg(short, long, num_args = 1..)]
    ignore: Option<Vec<String>>,

    /// Frame renderer: builtin or imagemagick.
    #[arg(long)]
    renderer: Option<RendererKind>,

    /// Settings file (JSON). Defaults to `<config dir>/blurwal/settings.json`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show info messages.
    #[arg(long)]
    verbose: bool,

    /// Show debug messages.
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }

    /// Flags given on the command line win over the settings file.
    fn blur_config(&self, settings: &Settings) -> Result<BlurConfig, CliError> {
        Ok(BlurConfig::new(
            self.min.unwrap_or(settings.min),
            self.steps.unwrap_or(settings.steps),
            self.blur.unwrap_or(settings.blur),
            self.ignore.clone().unwrap_or_else(|| settings.ignore.clone()),
        )?)
    }

    fn renderer_kind(&self, settings: &Settings) -> Result<RendererKind, CliError> {
        match self.renderer {
            Some(kind) => Ok(kind),
            None => Ok(settings.renderer_kind()?),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load(cli.config.as_deref())?;
    let config = cli.blur_config(&settings)?;
    let renderer = cli.renderer_kind(&settings)?;
    log::debug!("Running with {config:?}, renderer {renderer}");

    let paths = Paths::discover()?;
    paths.prepare()?;

    let background: Arc<dyn Background> = Arc::new(FehBackground::new(&paths.fehbg_file));
    let original = OriginalWallpaper::new(&paths.original_path_file, &paths.cache_dir);
    match original.restore_or_record(&*background)? {
        StartupAction::Restored(path) => log::info!("Restored {}", path.display()),
        StartupAction::Recorded(path) => log::info!("Original wallpaper: {}", path.display()),
    }

    let mut logger = StdoutPipelineLogger::new();
    if !config.ignored_classes.is_empty() {
        logger.info(&format!(
            "Ignoring window classes: {}",
            config.ignored_classes.join(", ")
        ));
    }

    let notifier: Arc<dyn Notifier> = Arc::new(NotifySendNotifier::new());
    let store = FrameStore::new(&paths.cache_dir);
    let frames = PrepareFramesUseCase::new(
        FrameGenerator::new(create_renderer(renderer)),
        store.clone(),
        &paths.temp_dir,
        notifier,
        &config,
    );
    frames.execute(&original.read()?, &mut logger)?;

    let coordinator = Arc::new(Mutex::new(BlurCoordinator::new(
        &config,
        background.clone(),
        store,
    )));
    let cleanup = Cleanup::new(coordinator.clone(), background.clone(), original.clone());
    let _signals = SignalGuard::install(cleanup.clone())?;

    let events = XpropEventSource::spawn()?;
    let mut watch = WatchWindowsUseCase::new(
        Box::new(events),
        Box::new(XpropWindowCounter::new()),
        background,
        original,
        frames,
        coordinator,
        config.ignored_classes.clone(),
    );
    let result = watch.execute(&mut logger);

    cleanup.run();
    result
}
