use std::sync::{Arc, Mutex, PoisonError};

use crate::desktop::domain::background::Background;
use crate::desktop::domain::original_wallpaper::OriginalWallpaper;
use crate::desktop::domain::window_counter::WindowCounter;
use crate::desktop::domain::window_event_source::WindowEventSource;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::prepare_frames_use_case::PrepareFramesUseCase;
use crate::transition::domain::blur_coordinator::BlurCoordinator;

pub type PipelineError = Box<dyn std::error::Error + Send + Sync>;

/// Main event loop: window event → refresh original → count → coordinate.
///
/// The coordinator is shared so that a signal handler can stop running
/// transitions before putting the original wallpaper back.
pub struct WatchWindowsUseCase {
    events: Box<dyn WindowEventSource>,
    counter: Box<dyn WindowCounter>,
    background: Arc<dyn Background>,
    original: OriginalWallpaper,
    frames: PrepareFramesUseCase,
    coordinator: Arc<Mutex<BlurCoordinator>>,
    ignored_classes: Vec<String>,
}

impl WatchWindowsUseCase {
    pub fn new(
        events: Box<dyn WindowEventSource>,
        counter: Box<dyn WindowCounter>,
        background: Arc<dyn Background>,
        original: OriginalWallpaper,
        frames: PrepareFramesUseCase,
        coordinator: Arc<Mutex<BlurCoordinator>>,
        ignored_classes: Vec<String>,
    ) -> Self {
        Self {
            events,
            counter,
            background,
            original,
            frames,
            coordinator,
            ignored_classes,
        }
    }

    /// Runs until the event source is exhausted or fails.
    pub fn execute(
        &mut self,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), PipelineError> {
        logger.info("Ready and waiting for window events...");

        while let Some(event) = self.events.next_event()? {
            log::debug!("Window event: {event:?}");
            self.refresh_original(logger)?;

            let window_count = match self.counter.count_open_windows(&self.ignored_classes) {
                Ok(count) => count,
                Err(e) => {
                    log::warn!("Could not count windows: {e}");
                    continue;
                }
            };

            self.coordinator
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .on_window_count(window_count);
        }

        log::info!("Window event source closed");
        Ok(())
    }

    /// A wallpaper set by someone else becomes the new original, and the
    /// frames are rebuilt from it before any further blurring.
    ///
    /// Running transitions are stopped first and the coordinator stays
    /// locked until the frames are rebuilt, so no frame is applied while
    /// its file is being rewritten.
    fn refresh_original(
        &self,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), PipelineError> {
        let current = self.background.current()?;
        if !self.original.changed_externally(&current)? {
            return Ok(());
        }

        log::info!("Wallpaper changed to {}", current.display());
        let mut coordinator = self
            .coordinator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        coordinator.halt();
        self.original.write(&current)?;
        self.frames.execute(&current, logger)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::domain::background::DesktopError;
    use crate::desktop::domain::notifier::NullNotifier;
    use crate::desktop::domain::window_event_source::WindowEvent;
    use crate::frames::domain::frame_generator::FrameGenerator;
    use crate::frames::domain::frame_renderer::{FrameRenderer, RenderError};
    use crate::frames::domain::frame_store::FrameStore;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::blur_config::BlurConfig;
    use crate::transition::domain::transition::TransitionState;
    use std::collections::VecDeque;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    // --- Stubs ---

    struct ScriptedEvents {
        events: VecDeque<Result<WindowEvent, String>>,
    }

    impl ScriptedEvents {
        fn new(events: Vec<Result<WindowEvent, String>>) -> Self {
            Self {
                events: events.into(),
            }
        }
    }

    impl WindowEventSource for ScriptedEvents {
        fn next_event(&mut self) -> Result<Option<WindowEvent>, DesktopError> {
            match self.events.pop_front() {
                Some(Ok(event)) => Ok(Some(event)),
                Some(Err(message)) => Err(message.into()),
                None => Ok(None),
            }
        }
    }

    struct ScriptedCounter {
        counts: Mutex<VecDeque<usize>>,
        seen_ignored: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl WindowCounter for ScriptedCounter {
        fn count_open_windows(&self, ignored_classes: &[String]) -> Result<usize, DesktopError> {
            self.seen_ignored
                .lock()
                .unwrap()
                .push(ignored_classes.to_vec());
            self.counts
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| "no more counts".into())
        }
    }

    /// Background that reports whatever was applied last.
    struct MemoryBackground {
        current: Mutex<PathBuf>,
        applied: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl Background for MemoryBackground {
        fn apply(&self, image: &Path) -> Result<(), DesktopError> {
            *self.current.lock().unwrap() = image.to_path_buf();
            self.applied.lock().unwrap().push(image.to_path_buf());
            Ok(())
        }

        fn current(&self) -> Result<PathBuf, DesktopError> {
            Ok(self.current.lock().unwrap().clone())
        }
    }

    struct CopyRenderer;

    impl FrameRenderer for CopyRenderer {
        fn render(&self, source: &Path, strength: f64, output: &Path) -> Result<(), RenderError> {
            let mut bytes = fs::read(source)?;
            bytes.extend_from_slice(format!("{strength}").as_bytes());
            fs::write(output, bytes)?;
            Ok(())
        }
    }

    /// Background whose `apply` stays open until a token arrives while `held`.
    struct HeldBackground {
        current: Mutex<PathBuf>,
        applied: Mutex<Vec<PathBuf>>,
        in_apply: AtomicBool,
        held: AtomicBool,
        tokens: crossbeam_channel::Receiver<()>,
    }

    impl Background for HeldBackground {
        fn apply(&self, image: &Path) -> Result<(), DesktopError> {
            self.in_apply.store(true, Ordering::SeqCst);
            self.applied.lock().unwrap().push(image.to_path_buf());
            if self.held.load(Ordering::SeqCst) {
                let _ = self.tokens.recv();
            }
            self.in_apply.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn current(&self) -> Result<PathBuf, DesktopError> {
            Ok(self.current.lock().unwrap().clone())
        }
    }

    /// Counts renders that happen while a frame is being applied.
    struct OverlapRenderer {
        background: Arc<HeldBackground>,
        overlapping: Arc<AtomicUsize>,
    }

    impl FrameRenderer for OverlapRenderer {
        fn render(&self, source: &Path, strength: f64, output: &Path) -> Result<(), RenderError> {
            if self.background.in_apply.load(Ordering::SeqCst) {
                self.overlapping.fetch_add(1, Ordering::SeqCst);
            }
            CopyRenderer.render(source, strength, output)
        }
    }

    struct Fixture {
        dir: TempDir,
        background: Arc<MemoryBackground>,
        applied: Arc<Mutex<Vec<PathBuf>>>,
        seen_ignored: Arc<Mutex<Vec<Vec<String>>>>,
        coordinator: Arc<Mutex<BlurCoordinator>>,
        original: OriginalWallpaper,
        cache: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("cache");
        fs::create_dir_all(&cache).unwrap();
        let wallpaper = dir.path().join("wall.png");
        fs::write(&wallpaper, b"wall").unwrap();

        let applied = Arc::new(Mutex::new(Vec::new()));
        let background = Arc::new(MemoryBackground {
            current: Mutex::new(wallpaper.clone()),
            applied: applied.clone(),
        });
        let original = OriginalWallpaper::new(dir.path().join("original-path"), &cache);
        original.write(&wallpaper).unwrap();

        let config = BlurConfig::new(2, 2, 4.0, Vec::new()).unwrap();
        let coordinator = Arc::new(Mutex::new(BlurCoordinator::new(
            &config,
            background.clone(),
            FrameStore::new(&cache),
        )));

        Fixture {
            dir,
            background,
            applied,
            seen_ignored: Arc::new(Mutex::new(Vec::new())),
            coordinator,
            original,
            cache,
        }
    }

    fn use_case(
        f: &Fixture,
        events: Vec<Result<WindowEvent, String>>,
        counts: Vec<usize>,
    ) -> WatchWindowsUseCase {
        let config = BlurConfig::new(2, 2, 4.0, Vec::new()).unwrap();
        let frames = PrepareFramesUseCase::new(
            FrameGenerator::new(Arc::new(CopyRenderer)).with_workers(1),
            FrameStore::new(&f.cache),
            f.dir.path().join("tmp"),
            Arc::new(NullNotifier),
            &config,
        );
        WatchWindowsUseCase::new(
            Box::new(ScriptedEvents::new(events)),
            Box::new(ScriptedCounter {
                counts: Mutex::new(counts.into()),
                seen_ignored: f.seen_ignored.clone(),
            }),
            f.background.clone(),
            OriginalWallpaper::new(f.original.file(), &f.cache),
            frames,
            f.coordinator.clone(),
            vec!["Conky".to_string()],
        )
    }

    fn frame(f: &Fixture, level: u32) -> PathBuf {
        FrameStore::new(&f.cache).frame_path(level)
    }

    #[test]
    fn test_each_event_counts_with_ignored_classes() {
        let f = fixture();
        let mut watch = use_case(
            &f,
            vec![Ok(WindowEvent::WindowsChanged), Ok(WindowEvent::WorkspaceChanged)],
            vec![0, 0],
        );

        watch.execute(&mut NullPipelineLogger).unwrap();

        let seen = f.seen_ignored.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|classes| classes == &vec!["Conky".to_string()]));
    }

    #[test]
    fn test_enough_windows_blur_to_last_frame() {
        let f = fixture();
        let mut watch = use_case(&f, vec![Ok(WindowEvent::WindowsChanged)], vec![3]);

        watch.execute(&mut NullPipelineLogger).unwrap();
        f.coordinator.lock().unwrap().wait();

        assert_eq!(
            *f.applied.lock().unwrap(),
            vec![frame(&f, 1), frame(&f, 2)]
        );
    }

    #[test]
    fn test_external_wallpaper_change_is_recorded() {
        let f = fixture();
        let replacement = f.dir.path().join("new.png");
        fs::write(&replacement, b"new wallpaper").unwrap();
        *f.background.current.lock().unwrap() = replacement.clone();

        let mut watch = use_case(&f, vec![Ok(WindowEvent::WindowsChanged)], vec![0]);
        watch.execute(&mut NullPipelineLogger).unwrap();

        assert_eq!(f.original.read().unwrap(), replacement);
        let first_frame = fs::read(frame(&f, 0)).unwrap();
        assert!(first_frame.starts_with(b"new wallpaper"));
    }

    #[test]
    fn test_count_failure_skips_event() {
        let f = fixture();
        let mut watch = use_case(
            &f,
            vec![Ok(WindowEvent::WindowsChanged), Ok(WindowEvent::WindowsChanged)],
            vec![],
        );

        watch.execute(&mut NullPipelineLogger).unwrap();

        assert_eq!(f.coordinator.lock().unwrap().transitions_started(), 0);
    }

    #[test]
    fn test_event_source_failure_ends_loop() {
        let f = fixture();
        let mut watch = use_case(
            &f,
            vec![Err("display closed".to_string()), Ok(WindowEvent::WindowsChanged)],
            vec![5],
        );

        let err = watch.execute(&mut NullPipelineLogger).unwrap_err();

        assert_eq!(err.to_string(), "display closed");
        assert!(f.seen_ignored.lock().unwrap().is_empty());
    }

    #[test]
    fn test_external_change_stops_transition_before_regenerating() {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("cache");
        fs::create_dir_all(&cache).unwrap();
        let wallpaper = dir.path().join("wall.png");
        fs::write(&wallpaper, b"wall").unwrap();
        let replacement = dir.path().join("new.png");
        fs::write(&replacement, b"new wallpaper").unwrap();

        let (tokens, rx) = crossbeam_channel::unbounded();
        let background = Arc::new(HeldBackground {
            current: Mutex::new(wallpaper.clone()),
            applied: Mutex::new(Vec::new()),
            in_apply: AtomicBool::new(false),
            held: AtomicBool::new(true),
            tokens: rx,
        });
        let original = OriginalWallpaper::new(dir.path().join("original-path"), &cache);
        original.write(&wallpaper).unwrap();

        let config = BlurConfig::new(2, 2, 4.0, Vec::new()).unwrap();
        let store = FrameStore::new(&cache);
        let coordinator = Arc::new(Mutex::new(BlurCoordinator::new(
            &config,
            background.clone(),
            store.clone(),
        )));

        // A blur is stuck applying its first frame when the wallpaper changes.
        coordinator.lock().unwrap().on_window_count(3);
        while background.applied.lock().unwrap().is_empty() {
            std::thread::sleep(Duration::from_millis(1));
        }
        *background.current.lock().unwrap() = replacement.clone();

        let cancel = coordinator.lock().unwrap().blur().unwrap().cancel_handle();
        let releaser = {
            let background = background.clone();
            std::thread::spawn(move || {
                let deadline = Instant::now() + Duration::from_secs(5);
                while !cancel.is_cancelled() && Instant::now() < deadline {
                    std::thread::sleep(Duration::from_millis(1));
                }
                background.held.store(false, Ordering::SeqCst);
                tokens.send(()).unwrap();
            })
        };

        let overlapping = Arc::new(AtomicUsize::new(0));
        let frames = PrepareFramesUseCase::new(
            FrameGenerator::new(Arc::new(OverlapRenderer {
                background: background.clone(),
                overlapping: overlapping.clone(),
            }))
            .with_workers(1),
            store.clone(),
            dir.path().join("tmp"),
            Arc::new(NullNotifier),
            &config,
        );
        let mut watch = WatchWindowsUseCase::new(
            Box::new(ScriptedEvents::new(vec![Ok(WindowEvent::WindowsChanged)])),
            Box::new(ScriptedCounter {
                counts: Mutex::new(vec![3].into()),
                seen_ignored: Arc::new(Mutex::new(Vec::new())),
            }),
            background.clone(),
            original.clone(),
            frames,
            coordinator.clone(),
            Vec::new(),
        );

        watch.execute(&mut NullPipelineLogger).unwrap();
        releaser.join().unwrap();
        coordinator.lock().unwrap().wait();

        assert_eq!(overlapping.load(Ordering::SeqCst), 0);
        assert_eq!(*background.applied.lock().unwrap(), vec![store.frame_path(1)]);
        assert_eq!(
            coordinator.lock().unwrap().blur().unwrap().state(),
            TransitionState::Cancelled
        );
        assert_eq!(original.read().unwrap(), replacement);
        assert!(fs::read(store.frame_path(0)).unwrap().starts_with(b"new wallpaper"));
    }
}
